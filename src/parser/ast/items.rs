use super::*;

// ============================================================================
// Source file
// ============================================================================

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    children_method!(items, Item);

    pub fn imports(&self) -> impl Iterator<Item = Import> + '_ {
        self.0.children().filter_map(Import::cast)
    }
}

ast_enum!(
    /// A module-level declaration
    Item {
        Import(Import) = IMPORT_DECL,
        Service(ServiceDecl) = SERVICE_DECL,
        Function(FunctionDef) = FUNCTION_DEF,
        TypeDef(TypeDef) = TYPE_DEF,
        Class(ClassDef) = CLASS_DEF,
        ModuleVar(ModuleVarDecl) = MODULE_VAR_DECL,
        Listener(ListenerDecl) = LISTENER_DECL,
    }
);

// ============================================================================
// Names
// ============================================================================

ast_node!(Name, NAME);

impl Name {
    pub fn text(&self) -> Option<String> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| !t.kind().is_trivia())
            .map(|t| strip_quoted_ident(t.text()))
    }
}

ast_node!(QualifiedName, QUALIFIED_NAME);

impl QualifiedName {
    /// Identifier segments, one for `name` and two for `prefix:name`
    pub fn segments(&self) -> Vec<String> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == SyntaxKind::IDENT)
            .map(|t| strip_quoted_ident(t.text()))
            .collect()
    }

    /// Module prefix of `prefix:name`
    pub fn prefix(&self) -> Option<String> {
        let segments = self.segments();
        (segments.len() == 2).then(|| segments[0].clone())
    }

    /// The unqualified name
    pub fn name(&self) -> String {
        self.segments().pop().unwrap_or_default()
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments().join(":"))
    }
}

// ============================================================================
// Import
// ============================================================================

ast_node!(Import, IMPORT_DECL);

impl Import {
    first_child_method!(module_name, ModuleName);

    /// Explicit `as` prefix, if any
    pub fn alias(&self) -> Option<String> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::IMPORT_PREFIX)
            .and_then(|n| n.children().find_map(Name::cast))
            .and_then(|n| n.text())
    }

    /// Prefix used to refer to the module: the alias, else the last name part.
    pub fn prefix(&self) -> Option<String> {
        self.alias()
            .or_else(|| self.module_name().and_then(|m| m.parts().pop()))
    }
}

ast_node!(ModuleName, MODULE_NAME);

impl ModuleName {
    fn idents(&self) -> Vec<String> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == SyntaxKind::IDENT)
            .map(|t| t.text().to_string())
            .collect()
    }

    /// Organization before the `/`, if written
    pub fn org(&self) -> Option<String> {
        if has_token(&self.0, SyntaxKind::SLASH) {
            self.idents().into_iter().next()
        } else {
            None
        }
    }

    /// Dotted module name parts after the organization
    pub fn parts(&self) -> Vec<String> {
        let mut idents = self.idents();
        if has_token(&self.0, SyntaxKind::SLASH) && !idents.is_empty() {
            idents.remove(0);
        }
        idents
    }

    /// `a.b.c`
    pub fn name(&self) -> String {
        self.parts().join(".")
    }
}

// ============================================================================
// Annotations
// ============================================================================

ast_node!(Annotation, ANNOTATION);

impl Annotation {
    first_child_method!(qualified_name, QualifiedName);
    first_child_method!(body, MappingConstructor);

    /// Check the annotation tag, e.g. `is("http", "Payload")` or `is_unqualified("display")`.
    pub fn is(&self, prefix: &str, name: &str) -> bool {
        self.qualified_name()
            .map(|qn| qn.prefix().as_deref() == Some(prefix) && qn.name() == name)
            .unwrap_or(false)
    }

    pub fn is_unqualified(&self, name: &str) -> bool {
        self.qualified_name()
            .map(|qn| qn.prefix().is_none() && qn.name() == name)
            .unwrap_or(false)
    }
}

ast_node!(MappingConstructor, MAPPING_CONSTRUCTOR);

impl MappingConstructor {
    children_method!(fields, MappingField);

    pub fn field(&self, key: &str) -> Option<MappingField> {
        self.fields().find(|f| f.key().as_deref() == Some(key))
    }
}

ast_node!(MappingField, MAPPING_FIELD);

impl MappingField {
    has_token_method!(has_colon, COLON, "label: \"x\"");
    has_token_method!(is_spread, DOT_DOT_DOT, "...rest");
    first_child_method!(value, Expr);

    /// Field name with quotes removed
    pub fn key(&self) -> Option<String> {
        let token = self
            .0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| !t.kind().is_trivia())?;
        match token.kind() {
            SyntaxKind::STRING => Some(unquote(token.text())),
            SyntaxKind::DOT_DOT_DOT => None,
            _ => Some(strip_quoted_ident(token.text())),
        }
    }
}

// ============================================================================
// Service
// ============================================================================

ast_node!(ServiceDecl, SERVICE_DECL);

impl ServiceDecl {
    children_method!(annotations, Annotation);
    first_child_method!(type_desc, TypeDesc);
    first_child_method!(path, ServicePath);
    first_child_method!(body, ObjectBody);

    /// Listener expressions after `on`
    pub fn listeners(&self) -> Vec<Expr> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::LISTENER_LIST)
            .map(|list| list.children().filter_map(Expr::cast).collect())
            .unwrap_or_default()
    }

    pub fn members(&self) -> impl Iterator<Item = ObjectMember> + '_ {
        self.body()
            .into_iter()
            .flat_map(|body| body.members().collect::<Vec<_>>())
    }

    /// Range of the `service` keyword, used when the declaration has no path.
    pub fn keyword(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::SERVICE_KW)
    }
}

ast_node!(ServicePath, SERVICE_PATH);

impl ServicePath {
    /// `/api/v1`, `/`, or the contents of a string-literal path
    pub fn text(&self) -> String {
        match find_token(&self.0, SyntaxKind::STRING) {
            Some(literal) => unquote(literal.text()),
            None => compact_text(&self.0).replace(' ', ""),
        }
    }
}

ast_node!(ObjectBody, OBJECT_BODY);

impl ObjectBody {
    children_method!(members, ObjectMember);
}

ast_enum!(
    /// A member of a service or class body
    ObjectMember {
        Function(FunctionDef) = FUNCTION_DEF,
        Field(ObjectField) = OBJECT_FIELD,
    }
);

ast_node!(ObjectField, OBJECT_FIELD);

impl ObjectField {
    children_method!(annotations, Annotation);
    has_token_method!(is_final, FINAL_KW, "final http:Client c;");
    has_token_method!(is_private, PRIVATE_KW);
    first_child_method!(type_desc, TypeDesc);
    first_child_method!(name, Name);
    child_after_token_method!(initializer, Expr, EQ, "Initializer after `=`.");
}

// ============================================================================
// Functions
// ============================================================================

ast_node!(FunctionDef, FUNCTION_DEF);

impl FunctionDef {
    children_method!(annotations, Annotation);
    has_token_method!(is_resource, RESOURCE_KW, "resource function get users() {}");
    has_token_method!(is_remote, REMOTE_KW, "remote function send() {}");
    has_token_method!(is_isolated, ISOLATED_KW);
    has_token_method!(is_public, PUBLIC_KW);
    first_child_method!(name, Name);
    first_child_method!(resource_path, ResourcePath);
    first_child_method!(param_list, ParamList);
    first_child_method!(return_type, ReturnType);
    first_child_method!(body, Block);

    pub fn params(&self) -> Vec<Param> {
        self.param_list()
            .map(|list| list.params().collect())
            .unwrap_or_default()
    }

    /// Range of the `function` keyword, for diagnostics on nameless functions.
    pub fn keyword(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::FUNCTION_KW)
    }
}

ast_node!(ResourcePath, RESOURCE_PATH);

/// One segment of a resource path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// `.` the root path
    Root,
    Literal(String),
    Param(PathParam),
}

impl ResourcePath {
    children_method!(path_params, PathParam);

    pub fn segments(&self) -> Vec<PathSegment> {
        let mut segments = Vec::new();
        for child in self.0.children_with_tokens() {
            match child {
                rowan::NodeOrToken::Token(t) => match t.kind() {
                    SyntaxKind::DOT => segments.push(PathSegment::Root),
                    SyntaxKind::SLASH => {}
                    kind if kind.is_trivia() => {}
                    SyntaxKind::STRING => segments.push(PathSegment::Literal(unquote(t.text()))),
                    _ => segments.push(PathSegment::Literal(strip_quoted_ident(t.text()))),
                },
                rowan::NodeOrToken::Node(n) => {
                    if let Some(param) = PathParam::cast(n) {
                        segments.push(PathSegment::Param(param));
                    }
                }
            }
        }
        segments
    }

    /// Canonical text, e.g. `users/[int id]/orders` or `.`
    pub fn text(&self) -> String {
        self.segments()
            .iter()
            .map(|segment| match segment {
                PathSegment::Root => ".".to_string(),
                PathSegment::Literal(s) => s.clone(),
                PathSegment::Param(p) => p.source_text(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

ast_node!(PathParam, PATH_PARAM);

impl PathParam {
    children_method!(annotations, Annotation);
    has_token_method!(is_rest, DOT_DOT_DOT, "[string... rest]");
    first_child_method!(type_desc, TypeDesc);
    first_child_method!(name, Name);
}

ast_node!(ParamList, PARAM_LIST);

impl ParamList {
    children_method!(params, Param);
}

ast_node!(Param, PARAM);

impl Param {
    children_method!(annotations, Annotation);
    has_token_method!(is_rest, DOT_DOT_DOT, "string... names");
    has_token_method!(is_defaultable, EQ, "int limit = 10");
    first_child_method!(type_desc, TypeDesc);
    first_child_method!(name, Name);
    child_after_token_method!(default_value, Expr, EQ, "Default value after `=`.");
}

ast_node!(ReturnType, RETURN_TYPE);

impl ReturnType {
    children_method!(annotations, Annotation);
    first_child_method!(type_desc, TypeDesc);
}

// ============================================================================
// Types and classes
// ============================================================================

ast_node!(TypeDef, TYPE_DEF);

impl TypeDef {
    children_method!(annotations, Annotation);
    has_token_method!(is_public, PUBLIC_KW);
    first_child_method!(name, Name);
    first_child_method!(type_desc, TypeDesc);
}

ast_node!(ClassDef, CLASS_DEF);

impl ClassDef {
    children_method!(annotations, Annotation);
    has_token_method!(is_client, CLIENT_KW, "client class Db {}");
    has_token_method!(is_isolated, ISOLATED_KW);
    first_child_method!(name, Name);
    first_child_method!(body, ObjectBody);

    pub fn members(&self) -> impl Iterator<Item = ObjectMember> + '_ {
        self.body()
            .into_iter()
            .flat_map(|body| body.members().collect::<Vec<_>>())
    }
}

// ============================================================================
// Module-level variables
// ============================================================================

ast_node!(ModuleVarDecl, MODULE_VAR_DECL);

impl ModuleVarDecl {
    children_method!(annotations, Annotation);
    has_token_method!(is_final, FINAL_KW);
    has_token_method!(is_configurable, CONFIGURABLE_KW, "configurable int port = ?;");
    first_child_method!(type_desc, TypeDesc);
    first_child_method!(name, Name);
    child_after_token_method!(initializer, Expr, EQ, "Initializer after `=`.");
}

ast_node!(ListenerDecl, LISTENER_DECL);

impl ListenerDecl {
    children_method!(annotations, Annotation);
    first_child_method!(type_desc, TypeDesc);
    first_child_method!(name, Name);
    child_after_token_method!(initializer, Expr, EQ, "Initializer after `=`.");
}
