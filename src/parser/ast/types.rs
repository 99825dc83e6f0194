use super::*;

ast_enum!(
    /// A type descriptor
    TypeDesc {
        Ref(TypeRef) = TYPE_REF,
        Union(UnionType) = UNION_TYPE,
        Array(ArrayType) = ARRAY_TYPE,
        Optional(OptionalType) = OPTIONAL_TYPE,
        Paren(ParenType) = PAREN_TYPE,
        Nil(NilType) = NIL_TYPE,
        Record(RecordType) = RECORD_TYPE,
    }
);

ast_node!(TypeRef, TYPE_REF);

impl TypeRef {
    first_child_method!(qualified_name, QualifiedName);
    has_token_method!(is_var, VAR_KW, "var x = 1;");

    /// Type arguments, e.g. `json` in `map<json>`
    pub fn type_args(&self) -> Vec<TypeDesc> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::TYPE_ARGS)
            .map(|args| args.children().filter_map(TypeDesc::cast).collect())
            .unwrap_or_default()
    }
}

ast_node!(UnionType, UNION_TYPE);

impl UnionType {
    children_method!(members, TypeDesc);
}

ast_node!(ArrayType, ARRAY_TYPE);

impl ArrayType {
    first_child_method!(element, TypeDesc);
}

ast_node!(OptionalType, OPTIONAL_TYPE);

impl OptionalType {
    first_child_method!(inner, TypeDesc);
}

ast_node!(ParenType, PAREN_TYPE);

impl ParenType {
    first_child_method!(inner, TypeDesc);
}

ast_node!(NilType, NIL_TYPE);

ast_node!(RecordType, RECORD_TYPE);

impl RecordType {
    children_method!(fields, RecordField);

    /// `record {| ... |}`
    pub fn is_closed(&self) -> bool {
        has_token(&self.0, SyntaxKind::PIPE)
    }
}

ast_node!(RecordField, RECORD_FIELD);

impl RecordField {
    children_method!(annotations, Annotation);
    has_token_method!(is_optional, QUESTION, "string nickname?;");
    first_child_method!(type_desc, TypeDesc);
    first_child_method!(name, Name);
    child_after_token_method!(default_value, Expr, EQ, "Default value after `=`.");
}
