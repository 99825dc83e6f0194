//! Common source code fixtures for tests.

pub const FILE: &str = "main.bal";

// Scenario A: one service, two resources, no clients
pub const SERVICE_TWO_RESOURCES: &str = r#"import ballerina/http;

service /orders on new http:Listener(9090) {
    resource function get items() returns string {
        return "items";
    }

    resource function post items(@http:Payload json order) returns json {
        return order;
    }
}
"#;

// Scenario B: a client field that is initialized but never called
pub const SERVICE_UNINVOKED_CLIENT: &str = r#"import ballerina/http;

service /billing on new http:Listener(8080) {
    final http:Client ledger = check new ("http://ledger");

    resource function get balance() returns int {
        return 0;
    }
}
"#;

// Scenario C: entry point with one required and one defaulted parameter
pub const MAIN_TWO_PARAMS: &str = r#"public function main(string region, int retries = 3) {
    int attempts = retries;
}
"#;

// Scenario D: display annotation with a field missing its value
pub const SERVICE_MALFORMED_DISPLAY: &str = r#"import ballerina/http;

@display { label: }
service /catalog on new http:Listener(9091) {
    resource function get products() returns string {
        return "products";
    }
}
"#;

pub const CALLS_AND_TYPES: &str = r#"import ballerina/http;

type Order record {
    string id;
    int quantity?;
};

function main() {
    http:Client api = check new ("http://api");
    Order order = load("o-1");
    json payload = check api->get("/orders");
    if order.quantity > 0 {
        audit(order);
    }
}

function load(string id) returns Order {
    return { id: id };
}

function audit(Order order) returns http:Response|error {
    while true {
        lock {
        }
    }
}
"#;

pub const BROKEN_AND_VALID: &str = r#"function () {
}

function valid() {
}
"#;

pub const CROSS_PACKAGE: &str = r#"import acme/shop.util;
import partner/ledger;

function report() returns util:Summary|ledger:Entry|string {
}
"#;

// A declared listener shared by a service, plus test functions
pub const LISTENER_AND_TESTS: &str = r#"import ballerina/http;
import ballerina/test;

listener http:Listener ep = new (9090);

service /health on ep {
    resource function get ping() returns string {
        return "pong";
    }
}

@test:Config { groups: ["smoke", "api"] }
function testPing() {
}

@test:Config {}
function testDefaults() {
}
"#;
