use super::*;
use crate::parser::parse;

fn source_file(source: &str) -> SourceFile {
    let parsed = parse(source);
    SourceFile::cast(parsed.syntax()).unwrap()
}

#[test]
fn test_ast_import() {
    let root = source_file("import ballerina/http;\nimport myorg/util.strings as str;");
    let imports: Vec<_> = root.imports().collect();
    assert_eq!(imports.len(), 2);

    let http = imports[0].module_name().unwrap();
    assert_eq!(http.org(), Some("ballerina".to_string()));
    assert_eq!(http.name(), "http");
    assert_eq!(imports[0].prefix(), Some("http".to_string()));

    let util = imports[1].module_name().unwrap();
    assert_eq!(util.name(), "util.strings");
    assert_eq!(imports[1].alias(), Some("str".to_string()));
    assert_eq!(imports[1].prefix(), Some("str".to_string()));
}

#[test]
fn test_ast_service_with_resources() {
    let root = source_file(
        r#"
@display { label: "Orders", id: "orders-svc" }
service /orders/v1 on new http:Listener(9090) {
    resource function get [int id]/items(string? sort) returns Item[] {
        return [];
    }

    remote function ping() {
    }
}
"#,
    );

    let items: Vec<_> = root.items().collect();
    let Item::Service(service) = &items[0] else {
        panic!("expected Service");
    };

    assert_eq!(service.path().unwrap().text(), "/orders/v1");
    let annotation = service.annotations().next().unwrap();
    assert!(annotation.is_unqualified("display"));
    let body = annotation.body().unwrap();
    let label = body.field("label").unwrap();
    assert!(label.has_colon());
    assert!(matches!(label.value(), Some(Expr::Literal(l)) if l.value() == "Orders"));

    let listeners = service.listeners();
    assert_eq!(listeners.len(), 1);
    let Expr::New(new_expr) = &listeners[0] else {
        panic!("expected new expression");
    };
    let listener_type = new_expr.type_ref().unwrap().qualified_name().unwrap();
    assert_eq!(listener_type.prefix(), Some("http".to_string()));
    assert_eq!(listener_type.name(), "Listener");

    let members: Vec<_> = service.members().collect();
    assert_eq!(members.len(), 2);
    let ObjectMember::Function(get) = &members[0] else {
        panic!("expected resource function");
    };
    assert!(get.is_resource());
    assert_eq!(get.name().unwrap().text(), Some("get".to_string()));
    assert_eq!(get.resource_path().unwrap().text(), "[int id]/items");
    assert_eq!(get.params().len(), 1);
    let returns = get.return_type().unwrap().type_desc().unwrap();
    assert!(matches!(returns, TypeDesc::Array(_)));

    let ObjectMember::Function(ping) = &members[1] else {
        panic!("expected remote function");
    };
    assert!(ping.is_remote());
    assert!(ping.resource_path().is_none());
}

#[test]
fn test_ast_root_resource_path() {
    let root = source_file("service / on ep { resource function get .() { } }");
    let Some(Item::Service(service)) = root.items().next() else {
        panic!("expected Service");
    };
    assert_eq!(service.path().unwrap().text(), "/");
    let Some(ObjectMember::Function(get)) = service.members().next() else {
        panic!("expected function");
    };
    assert_eq!(get.resource_path().unwrap().segments(), vec![PathSegment::Root]);
    assert_eq!(get.resource_path().unwrap().text(), ".");
}

#[test]
fn test_ast_params_required_and_defaultable() {
    let root = source_file("public function main(string name, int count = 3) {\n}");
    let Some(Item::Function(main)) = root.items().next() else {
        panic!("expected Function");
    };
    assert!(main.is_public());
    let params = main.params();
    assert_eq!(params.len(), 2);
    assert!(!params[0].is_defaultable());
    assert!(params[1].is_defaultable());
    assert_eq!(params[1].default_value().unwrap().source_text(), "3");
    assert!(main.return_type().is_none());
}

#[test]
fn test_ast_record_and_client_class() {
    let root = source_file(
        "type User record {| string name; int age?; Address[] addresses; |};\nclient class Db {\n  remote function query(string q) returns json { return {}; }\n}",
    );
    let items: Vec<_> = root.items().collect();

    let Item::TypeDef(user) = &items[0] else {
        panic!("expected TypeDef");
    };
    let Some(TypeDesc::Record(record)) = user.type_desc() else {
        panic!("expected record type");
    };
    assert!(record.is_closed());
    let fields: Vec<_> = record.fields().collect();
    assert_eq!(fields.len(), 3);
    assert!(fields[1].is_optional());
    assert!(!fields[0].is_optional());

    let Item::Class(db) = &items[1] else {
        panic!("expected Class");
    };
    assert!(db.is_client());
    assert_eq!(db.members().count(), 1);
}

#[test]
fn test_ast_union_type_members() {
    let root = source_file("function f() returns http:Response|error? { }");
    let Some(Item::Function(f)) = root.items().next() else {
        panic!("expected Function");
    };
    let Some(TypeDesc::Union(union)) = f.return_type().and_then(|r| r.type_desc()) else {
        panic!("expected union");
    };
    let members: Vec<_> = union.members().collect();
    assert_eq!(members.len(), 2);
    assert!(matches!(members[1], TypeDesc::Optional(_)));
    assert_eq!(union.source_text(), "http:Response|error?");
}

#[test]
fn test_ast_statements_and_actions() {
    let root = source_file(
        "function f() {\n  http:Client c = check new (\"http://x\");\n  json j = check c->get(\"/a\");\n  if j == () { return; } else { c->/users.post(j); }\n}",
    );
    let Some(Item::Function(f)) = root.items().next() else {
        panic!("expected Function");
    };
    let stmts: Vec<_> = f.body().unwrap().statements().collect();
    assert_eq!(stmts.len(), 3);

    let Stmt::VarDecl(decl) = &stmts[1] else {
        panic!("expected VarDecl");
    };
    let init = decl.initializer().unwrap().unwrap_transparent();
    let Expr::RemoteCall(call) = init else {
        panic!("expected remote call");
    };
    assert_eq!(call.method().unwrap().text(), Some("get".to_string()));

    let Stmt::If(if_stmt) = &stmts[2] else {
        panic!("expected If");
    };
    assert_eq!(if_stmt.condition().unwrap().source_text(), "j == ()");
    let else_block = if_stmt.else_clause().unwrap().block().unwrap();
    let Some(Stmt::Expr(expr_stmt)) = else_block.statements().next() else {
        panic!("expected expression statement");
    };
    let Some(Expr::ResourceAccess(access)) = expr_stmt.expr() else {
        panic!("expected resource access");
    };
    assert_eq!(access.path_text(), "/users");
    assert_eq!(access.method().unwrap().text(), Some("post".to_string()));
}
