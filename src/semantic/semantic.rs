use std::{
    collections::{HashMap, HashSet},
    iter::once,
    path::{Path, PathBuf},
    rc::Rc,
};

use tracing::{debug, info, trace, warn};

use crate::{
    ast::{
        ast::{create_identifier, requalify, retrieve_name, Block, Program},
        expressions::{Expr, ExprKind},
        statements::{
            AssignmentStmt, DeclarationStmt, ForStmt, FunctionDeclStmt, IfStmt, ImportStmt,
            MultipleDeclarationStmt, ReturnStmt, Stmt, StructStmt, UnionStmt,
        },
        types::{AnonymousType, Field, FunctionType, StructType, Type, TypeResolver, UnionType},
    },
    compile_unit,
    errors::errors::{Error, SemanticError},
    lexer::tokens::Token,
    session::Session,
};

use super::{
    modules::{normalize_path, Module},
    symbols::SymbolTable,
};

/// Type checks one program and records what a code generator needs to
/// lower it: resolved functions, declared types and imported modules.
///
/// Analysis never stops at the first error. Expressions that fail to check
/// evaluate to [`Type::Todo`], which compares equal to everything, so a
/// single mistake is reported once.
pub struct Semantic {
    session: Rc<Session>,
    program_id: String,
    directory: PathBuf,
    pub(crate) variables: SymbolTable<Type>,
    /// Structs and unions, scoped like variables.
    types: SymbolTable<Type>,
    functions: HashMap<String, FunctionDeclStmt>,
    pub(crate) modules: HashMap<String, Rc<Module>>,
    errors: Vec<Error>,
    /// Set once every path through the statements analysed so far returned.
    pub(crate) returns: bool,
    pub(crate) expected_return: Option<Type>,
    loop_depth: usize,
    /// Variable frame depth outside the innermost function literal. Locals
    /// bound at or below it, other than globals, are out of reach.
    pub(crate) capture_barrier: Option<usize>,
}

impl TypeResolver for Semantic {
    fn resolve_anonymous(&self, anonymous: &AnonymousType) -> Option<Type> {
        match anonymous.modules.split_first() {
            None => self
                .types
                .get(&anonymous.name)
                .cloned()
                .or_else(|| self.session.registered_type(&anonymous.name)),
            Some((alias, rest)) => {
                let module = self.modules.get(alias)?;
                let semantic = &module.unit.semantic;
                let program_id = semantic.program_id();
                let nested = AnonymousType {
                    name: requalify(&anonymous.name, program_id),
                    modules: rest.iter().map(|m| requalify(m, program_id)).collect(),
                };
                semantic.resolve_anonymous(&nested)
            }
        }
    }
}

/// The first named reference inside `ty` that could not be resolved.
fn first_unresolved(ty: &Type) -> Option<&AnonymousType> {
    match ty {
        Type::Anonymous(anonymous) => Some(anonymous),
        Type::Pointer(inner) | Type::Array { inner, .. } => first_unresolved(inner),
        Type::Function(function) => function
            .parameters
            .iter()
            .chain(once(&function.return_type))
            .find_map(first_unresolved),
        _ => None,
    }
}

impl Semantic {
    pub fn new(session: Rc<Session>, program_id: String, directory: PathBuf) -> Self {
        Semantic {
            session,
            program_id,
            directory,
            variables: SymbolTable::new(),
            types: SymbolTable::new(),
            functions: HashMap::new(),
            modules: HashMap::new(),
            errors: vec![],
            returns: false,
            expected_return: None,
            loop_depth: 0,
            capture_barrier: None,
        }
    }

    pub fn analyze(&mut self, program: &mut Program) {
        debug!(
            program_id = %self.program_id,
            statements = program.statements.len(),
            "analyzing program"
        );

        for statement in program.statements.iter_mut() {
            self.analyze_statement(statement);
        }

        debug!(
            program_id = %self.program_id,
            errors = self.errors.len(),
            functions = self.functions.len(),
            "analysis done"
        );
    }

    pub fn program_id(&self) -> &str {
        &self.program_id
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// A function declared in this program, by qualified name.
    pub fn function(&self, qualified_name: &str) -> Option<&FunctionDeclStmt> {
        self.functions.get(qualified_name)
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDeclStmt> {
        self.functions.values()
    }

    /// A struct or union declared in this program, by qualified name.
    pub fn defined_type(&self, qualified_name: &str) -> Option<&Type> {
        self.types.get(qualified_name)
    }

    /// An imported module, by qualified alias.
    pub fn module(&self, alias: &str) -> Option<&Rc<Module>> {
        self.modules.get(alias)
    }

    /// A top-level binding, by qualified name.
    pub fn symbol(&self, qualified_name: &str) -> Option<&Type> {
        self.variables.get(qualified_name)
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn take_errors(&mut self) -> Vec<Error> {
        std::mem::take(&mut self.errors)
    }

    pub(crate) fn push_error(&mut self, error: Error) {
        if self.session.config.accepts_semantic_error(self.errors.len()) {
            trace!(error = %error, "semantic error");
            self.errors.push(error);
        }
    }

    pub(crate) fn error(&mut self, error: SemanticError, token: &Token) {
        self.push_error(Error::new(error, token.span.start.clone()));
    }

    pub(crate) fn mismatch(&mut self, expected: &Type, got: &Type, token: &Token) {
        self.error(
            SemanticError::TypeMismatch {
                expected: expected.to_string(),
                got: got.to_string(),
            },
            token,
        );
    }

    /// Only top-level types are visible to other modules.
    fn define_type(&mut self, qualified_name: &str, ty: Type) {
        if self.types.depth() == 0 {
            self.session.register_type(qualified_name, ty.clone());
        }
        self.types.add(qualified_name, ty);
    }

    fn enter_scope(&mut self) {
        self.variables.enter_frame();
        self.types.enter_frame();
    }

    fn leave_scope(&mut self) {
        self.variables.leave_frame();
        self.types.leave_frame();
    }

    /// Resolves every named reference reachable without going through a
    /// struct or union. Unknown names are left as they are.
    pub fn resolve(&self, ty: &Type) -> Type {
        match ty {
            Type::Anonymous(_) => {
                let resolved = ty.unwrap_anonymous(self).into_owned();
                if let Type::Anonymous(_) = resolved {
                    resolved
                } else {
                    self.resolve(&resolved)
                }
            }
            Type::Pointer(inner) => Type::pointer(self.resolve(inner)),
            Type::Array { inner, length } => Type::array(self.resolve(inner), *length),
            Type::Function(function) => Type::Function(Rc::new(self.resolve_function(function))),
            _ => ty.clone(),
        }
    }

    pub(crate) fn resolve_function(&self, function: &FunctionType) -> FunctionType {
        FunctionType {
            name: function.name.clone(),
            names: function.names.clone(),
            parameters: function.parameters.iter().map(|p| self.resolve(p)).collect(),
            return_type: self.resolve(&function.return_type),
        }
    }

    /// Like [`resolve`](Self::resolve), but a name that stays unknown is an
    /// error and the whole type becomes `Todo`.
    pub(crate) fn resolve_or_report(&mut self, ty: &Type, token: &Token) -> Type {
        let resolved = self.resolve(ty);

        if let Some(unknown) = first_unresolved(&resolved) {
            let name = Type::Anonymous(unknown.clone()).to_string();
            self.error(SemanticError::UnknownType { name }, token);
            return Type::Todo;
        }

        resolved
    }

    /// Resolves the type of a value. Anything stored inline must have a
    /// layout, so a name that is still unknown here is an error.
    pub(crate) fn resolve_value(&mut self, ty: &Type, token: &Token) -> Type {
        let resolved = self.resolve(ty);

        let mut element = &resolved;
        while let Type::Array { inner, .. } = element {
            element = inner;
        }

        if let Type::Anonymous(_) = element {
            self.error(
                SemanticError::UnknownType {
                    name: element.to_string(),
                },
                token,
            );
            return Type::Todo;
        }

        resolved
    }

    pub(crate) fn analyze_statement(&mut self, statement: &mut Stmt) {
        match statement {
            Stmt::Expression(stmt) => {
                self.analyze_expression(&mut stmt.expression);
            }
            Stmt::Declaration(stmt) => self.analyze_declaration(stmt),
            Stmt::MultipleDeclaration(stmt) => self.analyze_multiple_declaration(stmt),
            Stmt::Assignment(stmt) => self.analyze_assignment(stmt),
            Stmt::Struct(stmt) => self.analyze_struct(stmt),
            Stmt::Union(stmt) => self.analyze_union(stmt),
            Stmt::FunctionDecl(stmt) => self.analyze_function(stmt),
            Stmt::If(stmt) => self.analyze_if(stmt),
            Stmt::For(stmt) => self.analyze_for(stmt),
            Stmt::Return(stmt) => self.analyze_return(stmt),
            Stmt::Break(token) => self.check_in_loop("break", token),
            Stmt::Continue(token) => self.check_in_loop("continue", token),
            Stmt::Extern(stmt) => {
                let function = Rc::new(self.resolve_function(&stmt.function));
                let name = create_identifier(&function.name, &self.program_id);
                self.variables.add(name, Type::Function(Rc::clone(&function)));
                stmt.function = function;
            }
            Stmt::Import(stmt) => self.analyze_import(stmt),
            // The type argument was substituted while parsing.
            Stmt::GenericType(_) => {}
        }
    }

    fn check_in_loop(&mut self, keyword: &str, token: &Token) {
        if self.loop_depth == 0 {
            self.error(
                SemanticError::OutsideLoop {
                    keyword: keyword.to_string(),
                },
                token,
            );
        }
    }

    fn analyze_declaration(&mut self, stmt: &mut DeclarationStmt) {
        let value = self.analyze_expression(&mut stmt.value);

        if stmt.ty.is_todo() {
            stmt.ty = self.resolve_value(&value, &stmt.token);
        } else {
            let declared = self.resolve_or_report(&stmt.ty, &stmt.token);
            if !declared.equals(&value, self) {
                self.mismatch(&declared, &value, &stmt.token);
            }
            stmt.ty = declared;
        }

        // Bound even on a mismatch so later uses don't cascade.
        self.variables.add(stmt.name.clone(), stmt.ty.clone());
    }

    /// Every value is evaluated before any name is bound, so
    /// `a, b := b, a` sees the outer `a` and `b`.
    fn analyze_multiple_declaration(&mut self, stmt: &mut MultipleDeclarationStmt) {
        let values = self.analyze_value_list(&mut stmt.value);

        if values.len() != stmt.names.len() {
            self.error(
                SemanticError::AssignmentCount {
                    expected: stmt.names.len(),
                    received: values.len(),
                },
                &stmt.token,
            );
        }

        let declared = if stmt.ty.is_todo() {
            None
        } else {
            Some(self.resolve_or_report(&stmt.ty, &stmt.token))
        };

        let mut types = Vec::with_capacity(stmt.names.len());
        for i in 0..stmt.names.len() {
            let value = values.get(i).cloned().unwrap_or(Type::Todo);
            let ty = match &declared {
                Some(declared) => {
                    if !declared.equals(&value, self) {
                        self.mismatch(declared, &value, &stmt.token);
                    }
                    declared.clone()
                }
                None => self.resolve_value(&value, &stmt.token),
            };
            types.push(ty);
        }

        for (name, ty) in stmt.names.iter().zip(types.iter()) {
            self.variables.add(name.clone(), ty.clone());
        }
        if let Some(declared) = declared {
            stmt.ty = declared;
        }
        stmt.types = types;
    }

    /// Types of a comma list, or of a single expression.
    fn analyze_value_list(&mut self, expr: &mut Expr) -> Vec<Type> {
        if !matches!(expr.kind, ExprKind::Comma(_)) {
            return vec![self.analyze_expression(expr)];
        }
        let ExprKind::Comma(values) = &mut expr.kind else {
            return vec![];
        };

        let types = values
            .iter_mut()
            .map(|value| self.analyze_expression(value))
            .collect();
        // A list is not a value of its own.
        expr.ty = Type::Void;
        types
    }

    fn analyze_assignment(&mut self, stmt: &mut AssignmentStmt) {
        let values = self.analyze_value_list(&mut stmt.value);
        let targets = self.analyze_value_list(&mut stmt.target);

        if targets.len() != values.len() {
            self.error(
                SemanticError::AssignmentCount {
                    expected: targets.len(),
                    received: values.len(),
                },
                &stmt.token,
            );
            return;
        }

        for (target, value) in targets.iter().zip(values.iter()) {
            if !target.equals(value, self) {
                self.mismatch(target, value, &stmt.token);
            }
        }
    }

    fn analyze_struct(&mut self, stmt: &mut StructStmt) {
        let name = stmt.ty.name.clone();
        // Registered up front so that pointer fields can refer back to it.
        self.define_type(&name, Type::Struct(Rc::clone(&stmt.ty)));

        let Some(fields) = self.resolve_fields(&name, &stmt.ty.fields, &stmt.token) else {
            return;
        };

        let resolved = Rc::new(StructType {
            name: name.clone(),
            fields,
            id: stmt.ty.id,
        });
        trace!(name = %name, fields = resolved.fields.len(), "struct declared");
        self.define_type(&name, Type::Struct(Rc::clone(&resolved)));
        stmt.ty = resolved;
    }

    fn analyze_union(&mut self, stmt: &mut UnionStmt) {
        let name = stmt.ty.name.clone();
        self.define_type(&name, Type::Union(Rc::clone(&stmt.ty)));

        let Some(fields) = self.resolve_fields(&name, &stmt.ty.fields, &stmt.token) else {
            return;
        };

        let resolved = Rc::new(UnionType {
            name: name.clone(),
            fields,
            id: stmt.ty.id,
        });
        self.define_type(&name, Type::Union(Rc::clone(&resolved)));
        stmt.ty = resolved;
    }

    /// Resolves the by-value fields of a struct or union named `owner`.
    /// Returns `None` if the type would contain itself.
    fn resolve_fields(&mut self, owner: &str, fields: &[Field], token: &Token) -> Option<Vec<Field>> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(fields.len());

        for field in fields {
            if !seen.insert(field.name.as_str()) {
                self.error(
                    SemanticError::DuplicateField {
                        field: field.name.clone(),
                    },
                    token,
                );
            }

            let ty = self.resolve_field(owner, &field.ty, token)?;
            resolved.push(Field::new(field.name.clone(), ty));
        }

        Some(resolved)
    }

    fn resolve_field(&mut self, owner: &str, ty: &Type, token: &Token) -> Option<Type> {
        match ty {
            Type::Array { inner, length } => {
                let inner = self.resolve_field(owner, inner, token)?;
                Some(Type::array(inner, *length))
            }
            Type::Anonymous(anonymous) => {
                if anonymous.modules.is_empty() && anonymous.name == owner {
                    self.recursive_type(owner, token);
                    return None;
                }

                let resolved = self.resolve(ty);
                if let Type::Anonymous(_) = resolved {
                    self.error(
                        SemanticError::UnknownType {
                            name: ty.to_string(),
                        },
                        token,
                    );
                    return Some(Type::Todo);
                }

                self.check_containment(owner, resolved, token)
            }
            Type::Struct(_) | Type::Union(_) => self.check_containment(owner, ty.clone(), token),
            // Pointers and function values never store their target inline,
            // so their names are resolved lazily on use.
            _ => Some(ty.clone()),
        }
    }

    fn check_containment(&mut self, owner: &str, ty: Type, token: &Token) -> Option<Type> {
        if self.contains_by_value(&ty, owner, &mut HashSet::new()) {
            self.recursive_type(owner, token);
            None
        } else {
            Some(ty)
        }
    }

    fn recursive_type(&mut self, owner: &str, token: &Token) {
        self.error(
            SemanticError::RecursiveType {
                name: retrieve_name(owner).to_string(),
            },
            token,
        );
    }

    /// Whether a value of `ty` stores a value of the type named `owner`.
    fn contains_by_value(&self, ty: &Type, owner: &str, visited: &mut HashSet<String>) -> bool {
        let fields = match ty {
            Type::Array { inner, .. } => return self.contains_by_value(inner, owner, visited),
            Type::Anonymous(anonymous) => {
                if anonymous.modules.is_empty() && anonymous.name == owner {
                    return true;
                }
                let resolved = self.resolve(ty);
                if let Type::Anonymous(_) = resolved {
                    return false;
                }
                return self.contains_by_value(&resolved, owner, visited);
            }
            Type::Struct(structure) => {
                if structure.name == owner {
                    return true;
                }
                if !visited.insert(structure.name.clone()) {
                    return false;
                }
                &structure.fields
            }
            Type::Union(union) => {
                if union.name == owner {
                    return true;
                }
                if !visited.insert(union.name.clone()) {
                    return false;
                }
                &union.fields
            }
            _ => return false,
        };

        fields
            .iter()
            .any(|field| self.contains_by_value(&field.ty, owner, visited))
    }

    fn analyze_function(&mut self, stmt: &mut FunctionDeclStmt) {
        let function = Rc::new(self.resolve_function(&stmt.function));
        let name = function.name.clone();
        trace!(function = %name, "analyzing function");

        self.variables
            .add(name.clone(), Type::Function(Rc::clone(&function)));

        self.analyze_function_body(&function, &mut stmt.body, retrieve_name(&name), &stmt.token);

        stmt.function = function;
        self.functions.insert(name, stmt.clone());
    }

    /// Checks a body against its signature in a fresh scope holding the
    /// parameters. Loop and return state of the enclosing code is restored
    /// afterwards.
    pub(crate) fn analyze_function_body(
        &mut self,
        function: &FunctionType,
        body: &mut Block,
        display_name: &str,
        token: &Token,
    ) {
        self.enter_scope();
        for (parameter, ty) in function.names.iter().zip(function.parameters.iter()) {
            self.variables.add(parameter.clone(), ty.clone());
        }

        let previous_return = self.expected_return.replace(function.return_type.clone());
        let previous_depth = std::mem::take(&mut self.loop_depth);
        let previous_returns = std::mem::take(&mut self.returns);

        self.analyze_statements(&mut body.statements);

        let returns = std::mem::replace(&mut self.returns, previous_returns);
        let void = function.return_type.equals(&Type::Void, self);
        if !returns && !void {
            self.error(
                SemanticError::NotAllPathsReturn {
                    function: display_name.to_string(),
                },
                token,
            );
        }

        self.leave_scope();
        self.expected_return = previous_return;
        self.loop_depth = previous_depth;
    }

    /// Analyses statements in order, skipping whatever follows a statement
    /// that returned on every path.
    fn analyze_statements(&mut self, statements: &mut [Stmt]) {
        for statement in statements.iter_mut() {
            if self.returns {
                trace!("skipping unreachable statements");
                break;
            }
            self.analyze_statement(statement);
        }
    }

    pub(crate) fn analyze_block(&mut self, block: &mut Block) {
        self.enter_scope();
        self.analyze_statements(&mut block.statements);
        self.leave_scope();
    }

    /// Analyses a branch and reports whether every path through it returned.
    fn analyze_branch(&mut self, block: &mut Block) -> bool {
        self.returns = false;
        self.analyze_block(block);
        std::mem::take(&mut self.returns)
    }

    fn analyze_if(&mut self, stmt: &mut IfStmt) {
        self.check_condition(&mut stmt.condition, &stmt.token);

        let mut returns = self.analyze_branch(&mut stmt.block);

        for else_if in stmt.else_ifs.iter_mut() {
            self.check_condition(&mut else_if.condition, &stmt.token);
            returns &= self.analyze_branch(&mut else_if.block);
        }

        returns &= match stmt.else_block.as_mut() {
            Some(block) => self.analyze_branch(block),
            None => false,
        };

        self.returns = returns;
    }

    fn check_condition(&mut self, condition: &mut Expr, token: &Token) {
        let ty = self.analyze_expression(condition);
        let resolved = self.resolve(&ty);

        if !resolved.is_todo() && !resolved.is_numeric() {
            self.mismatch(&Type::boolean(), &resolved, token);
        }
    }

    fn analyze_for(&mut self, stmt: &mut ForStmt) {
        self.enter_scope();

        if let Some(init) = stmt.init.as_mut() {
            self.analyze_statement(init);
        }
        if let Some(condition) = stmt.condition.as_mut() {
            self.check_condition(condition, &stmt.token);
        }
        if let Some(post) = stmt.post.as_mut() {
            self.analyze_statement(post);
        }

        self.loop_depth += 1;
        self.analyze_branch(&mut stmt.body);
        self.loop_depth -= 1;

        // A loop body may run zero times.
        self.returns = false;
        self.leave_scope();
    }

    fn analyze_return(&mut self, stmt: &mut ReturnStmt) {
        let got = match stmt.value.as_mut() {
            Some(value) => self.analyze_expression(value),
            None => Type::Void,
        };

        let Some(expected) = self.expected_return.clone() else {
            self.error(SemanticError::ReturnOutsideFunction, &stmt.token);
            return;
        };

        if !expected.equals(&got, self) {
            self.mismatch(&expected, &got, &stmt.token);
        }

        self.returns = true;
    }

    fn analyze_import(&mut self, stmt: &mut ImportStmt) {
        let mut generics = Vec::with_capacity(stmt.type_args.len());
        for ty in &stmt.type_args {
            generics.push(self.resolve_or_report(ty, &stmt.token));
        }
        stmt.type_args = generics.clone();

        let path = normalize_path(&self.directory.join(&stmt.path));
        info!(
            alias = retrieve_name(&stmt.name),
            path = %path.display(),
            generics = generics.len(),
            "importing module"
        );

        if !self.session.begin_import(&path) {
            let chain = self
                .session
                .import_chain()
                .iter()
                .chain(once(&path))
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            warn!(chain = %chain, "import cycle");
            self.error(SemanticError::ImportCycle { chain }, &stmt.token);
            return;
        }

        let result = self
            .session
            .load(&path)
            .map(|source| compile_unit(source, &path, generics, &self.session));
        self.session.end_import(&path);

        match result {
            Err(error) => self.error(
                SemanticError::ImportUnavailable {
                    path: stmt.path.clone(),
                    reason: error.to_string(),
                },
                &stmt.token,
            ),
            Ok(Err(errors)) => {
                self.error(
                    SemanticError::ImportFailed {
                        path: stmt.path.clone(),
                        count: errors.len(),
                    },
                    &stmt.token,
                );
                for error in errors {
                    self.push_error(error);
                }
            }
            Ok(Ok(unit)) => {
                debug!(
                    alias = retrieve_name(&stmt.name),
                    program_id = unit.semantic.program_id(),
                    "module imported"
                );
                self.modules.insert(
                    stmt.name.clone(),
                    Rc::new(Module {
                        alias: stmt.name.clone(),
                        path,
                        unit,
                    }),
                );
            }
        }
    }
}
