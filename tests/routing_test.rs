//! Route table behaviour for route-definition files.

use std::path::Path;

use dispatch_core::handler::{placeholder_action, Handler, Outcome, RequestContext};
use dispatch_core::routing::{HttpMethod, NotFound, RouteTable, RouteTableBuilder};

mod common;

fn invoke(table: &RouteTable, method: HttpMethod, url: &str) -> Result<(Outcome, RequestContext), NotFound> {
    let mut ctx = RequestContext::new(method, url);
    let outcome = table.dispatch(&mut ctx)?;
    Ok((outcome, ctx))
}

fn assert_invoked(table: &RouteTable, expected: &str, method: HttpMethod, url: &str) -> RequestContext {
    let (outcome, ctx) = invoke(table, method, url).expect("route should match");
    assert_eq!(outcome, Outcome::Text(expected.to_string()));
    ctx
}

#[test]
fn test_any_method() {
    let table = common::table("* /somewhere Application.foo");
    for method in HttpMethod::ALL {
        assert_invoked(&table, "Application.foo", method, "/somewhere");
    }
}

#[test]
fn test_dynamic_path() {
    let table = common::table("GET /service/{id}/cost Services.cost");
    let ctx = assert_invoked(&table, "Services.cost", HttpMethod::Get, "/service/abc/cost");
    assert_eq!(ctx.get_param("id"), Some("abc"));
}

#[test]
fn test_dynamic_path_with_regex() {
    let table = common::table("GET /service/{<[0-9]{3}>id}/cost Services.cost");
    let ctx = assert_invoked(&table, "Services.cost", HttpMethod::Get, "/service/123/cost");
    assert_eq!(ctx.get_param("id"), Some("123"));
}

#[test]
fn test_dynamic_path_not_matching_regex() {
    let table = common::table("GET /service/{<[0-9]{3}>id}/cost Services.cost");
    let err = invoke(&table, HttpMethod::Get, "/service/1234/cost").unwrap_err();
    assert_eq!(err.method, HttpMethod::Get);
    assert_eq!(err.path, "/service/1234/cost");
}

#[test]
fn test_regex_rejection_behaves_like_literal_mismatch() {
    let table = common::table(
        "GET /service/{<[0-9]{3}>id}/cost Services.cost\nGET /service/{name}/cost Services.byName",
    );
    // The constrained route simply does not match; the scan moves on.
    assert_invoked(&table, "Services.byName", HttpMethod::Get, "/service/1234/cost");
    assert_invoked(&table, "Services.cost", HttpMethod::Get, "/service/123/cost");
}

#[test]
fn test_method_specific_route() {
    let table = common::table("POST /orders Orders.create");
    assert_invoked(&table, "Orders.create", HttpMethod::Post, "/orders");
    assert!(invoke(&table, HttpMethod::Get, "/orders").is_err());
}

#[test]
fn test_built_in_static_dir() {
    let table = common::table("GET /public staticDir:/public");
    let resolved = table.resolve(HttpMethod::Get, "/public/file1.txt").unwrap();
    match resolved.handler() {
        Handler::StaticDir(dir) => assert_eq!(dir.base(), Path::new("/public")),
        other => panic!("expected static dir handler, got {other:?}"),
    }
    assert_eq!(resolved.remainder.as_deref(), Some("file1.txt"));

    let (outcome, _) = invoke(&table, HttpMethod::Get, "/public/file1.txt").unwrap();
    assert_eq!(outcome, Outcome::File("/public/file1.txt".into()));
}

#[test]
fn test_payload_contains_blank() {
    let table = common::table("GET /magic_words echo: Hello world!");
    let resolved = table.resolve(HttpMethod::Get, "/magic_words").unwrap();
    match resolved.handler() {
        Handler::Echo(echo) => assert_eq!(echo.message(), "Hello world!"),
        other => panic!("expected echo handler, got {other:?}"),
    }
}

#[test]
fn test_route_file_with_comments() {
    let table = common::table(
        r#"
        # Application routes
        GET     /                       Application.index
        GET     /users/{user}           Users.show

        # Everything else
        *       /health                 echo: ok
        "#,
    );
    assert_eq!(table.len(), 3);
    assert_invoked(&table, "Application.index", HttpMethod::Get, "/");
    assert_invoked(&table, "ok", HttpMethod::Delete, "/health");
}

#[test]
fn test_sample_routes_file() {
    let conf = Path::new(env!("CARGO_MANIFEST_DIR")).join("conf");
    let table = RouteTableBuilder::new(&placeholder_action)
        .build_sources(Some(&conf.join("routes")), &[])
        .expect("sample routes should build");

    let resolved = table.resolve(HttpMethod::Get, "/public/index.html").unwrap();
    let out = resolved.to_json();
    assert_eq!(out["handler"], format!("staticDir:{}", conf.join("public").display()));
    assert_eq!(out["remainder"], "index.html");

    let (outcome, _) = invoke(&table, HttpMethod::Get, "/public/index.html").unwrap();
    assert_eq!(outcome, Outcome::File(conf.join("public/index.html")));

    let resolved = table.resolve(HttpMethod::Post, "/rooms/lobby/broadcast").unwrap();
    let out = resolved.to_json();
    assert_eq!(out["handler"], "Connections.broadcast");
    assert_eq!(out["params"], serde_json::json!([["key", "lobby"]]));

    assert!(table.resolve(HttpMethod::Get, "/rooms/a%20b/count").is_err());
}
