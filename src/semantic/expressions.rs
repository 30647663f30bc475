use std::{collections::HashSet, rc::Rc};

use crate::{
    ast::{
        ast::{requalify, retrieve_name, Block, Operation},
        expressions::{Expr, ExprKind, FieldInit},
        types::{Field, FunctionType, Type},
    },
    errors::errors::SemanticError,
    lexer::tokens::Token,
};

use super::{modules::Module, semantic::Semantic};

impl Semantic {
    /// Type checks an expression, stores its type on the node and returns it.
    pub(crate) fn analyze_expression(&mut self, expr: &mut Expr) -> Type {
        let token = expr.token.clone();

        let ty = match &mut expr.kind {
            ExprKind::Integer(_) | ExprKind::Float(_) | ExprKind::String(_) => expr.ty.clone(),
            ExprKind::Identifier(name) => self.analyze_identifier(name, &token),
            ExprKind::Binary { left, op, right } => match op {
                Operation::Dot => self.analyze_access(left, right, &token),
                Operation::Assign => {
                    self.analyze_expression(right);
                    self.analyze_expression(left);
                    self.error(SemanticError::AssignmentInExpression, &token);
                    Type::Todo
                }
                _ => self.analyze_binary(left, *op, right, &token),
            },
            ExprKind::Prefix { op, operand } => self.analyze_prefix(*op, operand, &token),
            ExprKind::Index { base, index } => self.analyze_index(base, index, &token),
            ExprKind::Call { callee, args } => self.analyze_call(callee, args, &token),
            ExprKind::Builtin {
                name,
                type_args,
                args,
            } => self.analyze_builtin(name, type_args, args, &token),
            ExprKind::StructLiteral {
                name,
                module,
                fields,
            } => self.analyze_struct_literal(name, module.as_deref(), fields, &token),
            ExprKind::ArrayLiteral {
                array_type,
                elements,
            } => self.analyze_array_literal(array_type, elements, &token),
            ExprKind::Comma(expressions) => {
                self.analyze_expressions(expressions);
                self.error(SemanticError::UnexpectedComma, &token);
                Type::Todo
            }
            ExprKind::Function { function, body } => {
                self.analyze_function_literal(function, body, &token)
            }
        };

        expr.ty = ty.clone();
        ty
    }

    pub(crate) fn analyze_expressions(&mut self, exprs: &mut [Expr]) {
        for expr in exprs {
            self.analyze_expression(expr);
        }
    }

    fn analyze_identifier(&mut self, name: &str, token: &Token) -> Type {
        if let Some(ty) = self.variables.get(name).cloned() {
            if self.is_captured(name) {
                self.error(
                    SemanticError::CapturedVariable {
                        variable: retrieve_name(name).to_string(),
                    },
                    token,
                );
                return Type::Todo;
            }
            return self.resolve_value(&ty, token);
        }

        let error = if self.modules.contains_key(name) {
            SemanticError::ModuleAsValue {
                module: retrieve_name(name).to_string(),
            }
        } else {
            SemanticError::UndefinedVariable {
                variable: retrieve_name(name).to_string(),
            }
        };

        self.error(error, token);
        Type::Todo
    }

    /// Whether `name` is a local of a function enclosing the current
    /// function literal.
    fn is_captured(&self, name: &str) -> bool {
        match (self.capture_barrier, self.variables.depth_of(name)) {
            (Some(barrier), Some(depth)) => depth > 0 && depth <= barrier,
            _ => false,
        }
    }

    /// Function literals are checked like declarations, but can only see
    /// globals and their own locals.
    fn analyze_function_literal(
        &mut self,
        function: &mut Rc<FunctionType>,
        body: &mut Block,
        token: &Token,
    ) -> Type {
        let resolved = Rc::new(self.resolve_function(function));

        let previous = self.capture_barrier.replace(self.variables.depth());
        self.analyze_function_body(&resolved, body, "<anonymous>", token);
        self.capture_barrier = previous;

        *function = Rc::clone(&resolved);
        Type::Function(resolved)
    }

    fn analyze_binary(&mut self, left: &mut Expr, op: Operation, right: &mut Expr, token: &Token) -> Type {
        let left = self.analyze_expression(left);
        let right = self.analyze_expression(right);
        let left = self.resolve(&left);
        let right = self.resolve(&right);

        let mut numeric = true;
        for side in [&left, &right] {
            if !side.is_todo() && !side.is_numeric() {
                self.error(
                    SemanticError::ExpectedNumeric {
                        got: side.to_string(),
                    },
                    token,
                );
                numeric = false;
            }
        }

        if numeric && !left.equals(&right, self) {
            self.mismatch(&left, &right, token);
        }

        if op.is_comparison() {
            Type::boolean()
        } else if left.is_todo() {
            right
        } else {
            left
        }
    }

    fn analyze_prefix(&mut self, op: Operation, operand: &mut Expr, token: &Token) -> Type {
        let ty = self.analyze_expression(operand);
        let resolved = self.resolve(&ty);

        match op {
            Operation::Not | Operation::Negate | Operation::Identity => {
                if !resolved.is_todo() && !resolved.is_numeric() {
                    self.error(
                        SemanticError::ExpectedNumeric {
                            got: resolved.to_string(),
                        },
                        token,
                    );
                }
                resolved
            }
            Operation::Reference => Type::pointer(resolved),
            Operation::Dereference => match resolved {
                Type::Pointer(inner) => self.resolve_value(&inner, token),
                Type::Todo => Type::Todo,
                other => {
                    self.error(
                        SemanticError::ExpectedPointer {
                            got: other.to_string(),
                        },
                        token,
                    );
                    Type::Todo
                }
            },
            _ => unreachable!("{} is not a prefix operator", op),
        }
    }

    fn analyze_index(&mut self, base: &mut Expr, index: &mut Expr, token: &Token) -> Type {
        let base = self.analyze_expression(base);
        let index = self.analyze_expression(index);

        let index = self.resolve(&index);
        if !index.is_todo() && !index.is_numeric() {
            self.error(
                SemanticError::ExpectedNumeric {
                    got: index.to_string(),
                },
                token,
            );
        }

        match self.resolve(&base) {
            Type::Array { inner, .. } | Type::Pointer(inner) => self.resolve_value(&inner, token),
            Type::Todo => Type::Todo,
            other => {
                self.error(
                    SemanticError::NotIndexable {
                        got: other.to_string(),
                    },
                    token,
                );
                Type::Todo
            }
        }
    }

    fn analyze_call(&mut self, callee: &mut Expr, args: &mut [Expr], token: &Token) -> Type {
        let callee_type = self.analyze_expression(callee);

        let function = match self.resolve(&callee_type) {
            Type::Function(function) => function,
            Type::Todo => {
                self.analyze_expressions(args);
                return Type::Todo;
            }
            other => {
                self.error(
                    SemanticError::NotCallable {
                        callee: callee.to_string(),
                        ty: other.to_string(),
                    },
                    token,
                );
                self.analyze_expressions(args);
                return Type::Todo;
            }
        };

        if args.len() != function.parameters.len() {
            self.error(
                SemanticError::ArgumentCount {
                    expected: function.parameters.len(),
                    received: args.len(),
                },
                token,
            );
        }

        for (i, arg) in args.iter_mut().enumerate() {
            let ty = self.analyze_expression(arg);
            if let Some(parameter) = function.parameters.get(i) {
                if !parameter.equals(&ty, self) {
                    self.mismatch(parameter, &ty, &arg.token);
                }
            }
        }

        self.resolve_value(&function.return_type, token)
    }

    /// `a.b`: a member of an imported module, or a field of a struct or
    /// union. Pointers to structs are dereferenced implicitly.
    fn analyze_access(&mut self, left: &mut Expr, right: &mut Expr, token: &Token) -> Type {
        if let ExprKind::Identifier(alias) = &left.kind {
            let shadowed = self.variables.contains(alias);
            if let Some(module) = self.modules.get(alias).filter(|_| !shadowed).cloned() {
                left.ty = Type::Module(alias.clone());
                return self.analyze_module_member(&module, right, token);
            }
        }

        let object = self.analyze_expression(left);
        let object = match self.resolve(&object) {
            Type::Pointer(inner) => self.resolve_value(&inner, token),
            other => other,
        };

        let fields: &[Field] = match &object {
            Type::Struct(structure) => &structure.fields,
            Type::Union(union) => &union.fields,
            Type::Todo => return Type::Todo,
            other => {
                self.error(
                    SemanticError::ExpectedStruct {
                        got: other.to_string(),
                    },
                    token,
                );
                return Type::Todo;
            }
        };

        let Some(name) = right.identifier_name().map(retrieve_name) else {
            self.error(
                SemanticError::UnknownStructField {
                    field: right.to_string(),
                    ty: object.to_string(),
                },
                token,
            );
            return Type::Todo;
        };

        match fields.iter().find(|field| field.name == name) {
            Some(field) => {
                let ty = self.resolve_value(&field.ty, token);
                right.ty = ty.clone();
                ty
            }
            None => {
                self.error(
                    SemanticError::UnknownStructField {
                        field: name.to_string(),
                        ty: object.to_string(),
                    },
                    token,
                );
                Type::Todo
            }
        }
    }

    /// Renames `member` to the module's qualified name and returns its type.
    fn analyze_module_member(&mut self, module: &Module, member: &mut Expr, token: &Token) -> Type {
        let semantic = &module.unit.semantic;

        let found = match &member.kind {
            ExprKind::Identifier(name) => {
                let qualified = requalify(name, semantic.program_id());
                semantic
                    .symbol(&qualified)
                    .cloned()
                    .map(|ty| (qualified, ty))
            }
            _ => None,
        };

        let Some((qualified, ty)) = found else {
            self.error(
                SemanticError::UnknownModuleMember {
                    module: retrieve_name(&module.alias).to_string(),
                    member: member.to_string(),
                },
                token,
            );
            return Type::Todo;
        };

        let ty = self.resolve(&ty);
        member.kind = ExprKind::Identifier(qualified);
        member.ty = ty.clone();
        ty
    }

    fn analyze_struct_literal(
        &mut self,
        name: &mut String,
        module: Option<&str>,
        fields: &mut [FieldInit],
        token: &Token,
    ) -> Type {
        let declared = match module {
            Some(alias) => match self.modules.get(alias).cloned() {
                Some(module) => {
                    let semantic = &module.unit.semantic;
                    *name = requalify(name, semantic.program_id());
                    semantic.defined_type(name).cloned()
                }
                None => {
                    self.error(
                        SemanticError::UndefinedVariable {
                            variable: retrieve_name(alias).to_string(),
                        },
                        token,
                    );
                    self.analyze_field_values(fields);
                    return Type::Todo;
                }
            },
            None => Some(self.resolve(&Type::anonymous(name.clone()))),
        };

        let structure = match declared {
            Some(Type::Struct(structure)) => structure,
            Some(Type::Anonymous(_)) | None => {
                self.error(
                    SemanticError::UnknownType {
                        name: retrieve_name(name).to_string(),
                    },
                    token,
                );
                self.analyze_field_values(fields);
                return Type::Todo;
            }
            Some(other) => {
                self.error(
                    SemanticError::ExpectedStruct {
                        got: other.to_string(),
                    },
                    token,
                );
                self.analyze_field_values(fields);
                return Type::Todo;
            }
        };

        let mut seen = HashSet::new();
        for init in fields.iter_mut() {
            if !seen.insert(init.name.clone()) {
                self.error(
                    SemanticError::DuplicateField {
                        field: init.name.clone(),
                    },
                    &init.value.token,
                );
            }

            let value = self.analyze_expression(&mut init.value);
            match structure.field(&init.name) {
                Some(field) => {
                    if !field.ty.equals(&value, self) {
                        self.mismatch(&field.ty, &value, &init.value.token);
                    }
                }
                None => self.error(
                    SemanticError::UnknownStructField {
                        field: init.name.clone(),
                        ty: retrieve_name(&structure.name).to_string(),
                    },
                    &init.value.token,
                ),
            }
        }

        Type::Struct(structure)
    }

    fn analyze_field_values(&mut self, fields: &mut [FieldInit]) {
        for init in fields {
            self.analyze_expression(&mut init.value);
        }
    }

    fn analyze_array_literal(&mut self, array_type: &mut Type, elements: &mut [Expr], token: &Token) -> Type {
        let ty = self.resolve_or_report(array_type, token);
        *array_type = ty.clone();

        let Type::Array { inner, length } = ty.clone() else {
            self.analyze_expressions(elements);
            return ty;
        };

        if elements.len() as u64 > length {
            self.error(
                SemanticError::ArrayLiteralTooLong {
                    length,
                    received: elements.len(),
                },
                token,
            );
        }

        for element in elements.iter_mut() {
            let value = self.analyze_expression(element);
            if !inner.equals(&value, self) {
                self.mismatch(&inner, &value, &element.token);
            }
        }

        ty
    }
}
