use std::net::SocketAddr;

use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

struct TestApp {
    base_url: String,
}

impl TestApp {
    fn modules(&self) -> String {
        format!("{}/api/v1/machine-learning-module", self.base_url)
    }

    fn module(&self, id: impl std::fmt::Display) -> String {
        format!("{}/{}", self.modules(), id)
    }
}

/// Serve the real router over a private in-memory SQLite database.
async fn start_server() -> anyhow::Result<TestApp> {
    let mut cfg = configs::AppConfig::default();
    cfg.database.url = "sqlite::memory:".into();
    let app = server::startup::build_app(&cfg).await?;

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

fn payload(name: &str) -> Value {
    json!({"name": name, "versionNumber": "1.0", "framework": "CNN", "modelPath": "/models/c1"})
}

async fn create(c: &reqwest::Client, app: &TestApp, body: Value) -> anyhow::Result<Value> {
    let res = c.post(app.modules()).json(&body).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    Ok(res.json().await?)
}

#[tokio::test]
async fn e2e_health_and_openapi() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c.get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");

    let res = c.get(format!("{}/api-docs/openapi.json", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let doc = res.json::<Value>().await?;
    assert!(doc["paths"]["/api/v1/machine-learning-module/{id}"].is_object());
    Ok(())
}

#[tokio::test]
async fn e2e_create_update_delete_lifecycle() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let created = create(&c, &app, payload("Classifier")).await?;
    assert_eq!(created["id"], 1);
    assert_eq!(created["version"], 1);
    assert_eq!(created["isActive"], false);
    assert_eq!(created["createdAt"], created["updatedAt"]);

    let res = c.get(app.module(1)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["name"], "Classifier");

    let res = c.put(app.module(1)).json(&payload("Classifier-v2")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let updated = res.json::<Value>().await?;
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["name"], "Classifier-v2");
    assert_eq!(updated["version"], 2);
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let res = c.delete(app.module(1)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    assert!(res.bytes().await?.is_empty());

    assert_eq!(c.get(app.module(1)).send().await?.status(), HttpStatusCode::NOT_FOUND);
    assert_eq!(c.delete(app.module(1)).send().await?.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_absent_ids_are_404() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c.get(app.module(42)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Not Found");
    assert!(body["message"].as_str().unwrap_or_default().contains("42"));

    assert_eq!(c.put(app.module(42)).json(&payload("x")).send().await?.status(), HttpStatusCode::NOT_FOUND);
    assert_eq!(c.delete(app.module(42)).send().await?.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_bad_input_is_400() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    // missing required fields
    let res = c.post(app.modules()).json(&json!({"name": "only-name"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "Bad Request");

    // null body
    let res = c.post(app.modules()).header("content-type", "application/json").body("null").send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    // malformed JSON
    let res = c.post(app.modules()).header("content-type", "application/json").body("{not json").send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    // name too long
    let res = c.post(app.modules()).json(&payload(&"n".repeat(101))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    assert_eq!(c.get(app.module("abc")).send().await?.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(c.get(format!("{}/search", app.modules())).send().await?.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(c.get(format!("{}?sort=colour", app.modules())).send().await?.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(c.get(format!("{}?sort=name,sideways", app.modules())).send().await?.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(c.get(format!("{}?page=-1", app.modules())).send().await?.status(), HttpStatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn e2e_search_is_case_insensitive() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    for name in ["Model-A", "MODEL_B", "xyz"] {
        create(&c, &app, payload(name)).await?;
    }

    let res = c.get(format!("{}/search", app.modules())).query(&[("name", "mod")]).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let found = res.json::<Vec<Value>>().await?;
    let mut names: Vec<&str> = found.iter().filter_map(|m| m["name"].as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["MODEL_B", "Model-A"]);
    Ok(())
}

#[tokio::test]
async fn e2e_list_pages_newest_first() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    create(&c, &app, payload("first")).await?;
    create(&c, &app, payload("second")).await?;

    let res = c.get(app.modules()).query(&[("size", "2")]).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let page = res.json::<Value>().await?;
    assert_eq!(page["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(page["totalElements"], 2);
    assert_eq!(page["totalPages"], 1);
    assert_eq!(page["page"], 0);
    assert_eq!(page["size"], 2);
    assert_eq!(page["items"][0]["name"], "second");
    assert_eq!(page["items"][1]["name"], "first");

    let res = c.get(app.modules()).query(&[("size", "1"), ("page", "1"), ("sort", "name,asc")]).send().await?;
    let page = res.json::<Value>().await?;
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["items"][0]["name"], "second");
    Ok(())
}

#[tokio::test]
async fn e2e_stale_version_is_409() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    create(&c, &app, payload("Ranker")).await?;

    let mut first = payload("Ranker-2");
    first["version"] = json!(1);
    assert_eq!(c.put(app.module(1)).json(&first).send().await?.status(), HttpStatusCode::OK);

    let mut stale = payload("Ranker-3");
    stale["version"] = json!(1);
    let res = c.put(app.module(1)).json(&stale).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CONFLICT);
    assert_eq!(res.json::<Value>().await?["error"], "Conflict");

    let current = c.get(app.module(1)).send().await?.json::<Value>().await?;
    assert_eq!(current["name"], "Ranker-2");
    assert_eq!(current["version"], 2);
    Ok(())
}

#[tokio::test]
async fn e2e_page_offset_overflow_is_400() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    create(&c, &app, payload("only")).await?;

    for (page, size) in [("18446744073709551615", "10"), ("1000000000000000000", "100")] {
        let res = c.get(app.modules()).query(&[("page", page), ("size", size)]).send().await?;
        assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
        assert_eq!(res.json::<Value>().await?["error"], "Bad Request");
    }

    // past the last page but addressable: empty page, totals intact
    let res = c.get(app.modules()).query(&[("page", "5000"), ("size", "10")]).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let page = res.json::<Value>().await?;
    assert_eq!(page["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(page["totalElements"], 1);
    Ok(())
}

#[tokio::test]
async fn e2e_null_is_active_defaults_to_false() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let mut body = payload("nullable");
    body["isActive"] = Value::Null;
    let created = create(&c, &app, body).await?;
    assert_eq!(created["isActive"], false);
    Ok(())
}
