//! Mock GitHub REST API for sync tests.
//!
//! Serves the handful of endpoints the client uses, paginates every list with
//! a small page size and a `Link` header, and rejects unknown tokens with 401.

use actix_web::http::header;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, get, web};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

/// Token the mock accepts.
pub const VALID_TOKEN: &str = "gho_mock_valid_token";

/// One organization and the repositories it lists.
#[derive(Clone)]
pub struct MockOrg {
    pub id: i64,
    pub login: String,
    pub name: Option<String>,
    pub repos: Vec<Value>,
}

/// Shared state for the mock GitHub API.
pub struct MockGitHubState {
    pub user: Value,
    pub orgs: Vec<MockOrg>,
    pub user_repos: Vec<Value>,
    pub page_size: usize,
    /// Paths requested so far, in order.
    pub requests: Vec<String>,
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<usize>,
}

/// Build a repository payload the way GitHub lists it.
pub fn repo_json(id: i64, name: &str, owner: &str, owner_type: &str, admin: bool) -> Value {
    json!({
        "id": id,
        "name": name,
        "full_name": format!("{}/{}", owner, name),
        "html_url": format!("https://github.com/{}/{}", owner, name),
        "description": null,
        "fork": false,
        "private": false,
        "owner": {"id": owner_id(owner), "login": owner, "type": owner_type},
        "permissions": {"admin": admin, "push": admin, "pull": true}
    })
}

/// Stable fake id for an owner login.
pub fn owner_id(login: &str) -> i64 {
    match login {
        "acme" => 100,
        "globex" => 200,
        _ => 7,
    }
}

fn authorized(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", VALID_TOKEN))
        .unwrap_or(false)
}

fn has_user_agent(req: &HttpRequest) -> bool {
    req.headers().contains_key(header::USER_AGENT)
}

/// Gate every request on auth and record it.
fn check(req: &HttpRequest, state: &Mutex<MockGitHubState>) -> Option<HttpResponse> {
    state.lock().unwrap().requests.push(req.path().to_string());

    if !has_user_agent(req) {
        return Some(HttpResponse::Forbidden().json(json!({
            "message": "Request forbidden by administrative rules. Please make sure your request has a User-Agent header."
        })));
    }
    if !authorized(req) {
        return Some(HttpResponse::Unauthorized().json(json!({"message": "Bad credentials"})));
    }
    None
}

fn paginate(req: &HttpRequest, items: &[Value], page_size: usize, page: usize) -> HttpResponse {
    let start = (page - 1) * page_size;
    let chunk: Vec<Value> = items.iter().skip(start).take(page_size).cloned().collect();

    let mut response = HttpResponse::Ok();
    if start + page_size < items.len() {
        let conn = req.connection_info();
        let next = format!(
            "http://{}{}?per_page=100&page={}",
            conn.host(),
            req.path(),
            page + 1
        );
        let last_page = items.len().div_ceil(page_size);
        let last = format!(
            "http://{}{}?per_page=100&page={}",
            conn.host(),
            req.path(),
            last_page
        );
        response.insert_header((
            header::LINK,
            format!("<{}>; rel=\"next\", <{}>; rel=\"last\"", next, last),
        ));
    }
    response.json(chunk)
}

#[get("/user")]
async fn user(req: HttpRequest, state: web::Data<Arc<Mutex<MockGitHubState>>>) -> HttpResponse {
    if let Some(denied) = check(&req, &state) {
        return denied;
    }
    HttpResponse::Ok().json(state.lock().unwrap().user.clone())
}

#[get("/user/orgs")]
async fn user_orgs(
    req: HttpRequest,
    query: web::Query<PageQuery>,
    state: web::Data<Arc<Mutex<MockGitHubState>>>,
) -> HttpResponse {
    if let Some(denied) = check(&req, &state) {
        return denied;
    }
    let state = state.lock().unwrap();
    // The list endpoint carries no display name.
    let orgs: Vec<Value> = state
        .orgs
        .iter()
        .map(|o| json!({"id": o.id, "login": o.login}))
        .collect();
    paginate(&req, &orgs, state.page_size, query.page.unwrap_or(1))
}

#[get("/orgs/{login}")]
async fn org(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<Arc<Mutex<MockGitHubState>>>,
) -> HttpResponse {
    if let Some(denied) = check(&req, &state) {
        return denied;
    }
    let login = path.into_inner();
    let state = state.lock().unwrap();
    match state.orgs.iter().find(|o| o.login == login) {
        Some(o) => HttpResponse::Ok().json(json!({"id": o.id, "login": o.login, "name": o.name})),
        None => HttpResponse::NotFound().json(json!({"message": "Not Found"})),
    }
}

#[get("/orgs/{login}/repos")]
async fn org_repos(
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    state: web::Data<Arc<Mutex<MockGitHubState>>>,
) -> HttpResponse {
    if let Some(denied) = check(&req, &state) {
        return denied;
    }
    let login = path.into_inner();
    let state = state.lock().unwrap();
    match state.orgs.iter().find(|o| o.login == login) {
        Some(o) => paginate(&req, &o.repos, state.page_size, query.page.unwrap_or(1)),
        None => HttpResponse::NotFound().json(json!({"message": "Not Found"})),
    }
}

#[get("/user/repos")]
async fn user_repos(
    req: HttpRequest,
    query: web::Query<PageQuery>,
    state: web::Data<Arc<Mutex<MockGitHubState>>>,
) -> HttpResponse {
    if let Some(denied) = check(&req, &state) {
        return denied;
    }
    let state = state.lock().unwrap();
    paginate(&req, &state.user_repos, state.page_size, query.page.unwrap_or(1))
}

/// Mock GitHub API server.
pub struct MockGitHub {
    pub api_url: String,
    pub state: Arc<Mutex<MockGitHubState>>,
}

impl MockGitHub {
    /// Start the mock on an ephemeral port.
    pub async fn start(state: MockGitHubState) -> Self {
        let state = Arc::new(Mutex::new(state));

        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
        let port = listener.local_addr().unwrap().port();
        let api_url = format!("http://127.0.0.1:{}", port);

        let state_data = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(state_data.clone()))
                .service(user_orgs)
                .service(user_repos)
                .service(user)
                .service(org_repos)
                .service(org)
        })
        .workers(1)
        .listen(listener)
        .expect("failed to listen")
        .disable_signals()
        .run();

        tokio::spawn(server);

        MockGitHub { api_url, state }
    }

    /// Paths requested so far.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Change what GitHub reports between syncs.
    pub fn update(&self, f: impl FnOnce(&mut MockGitHubState)) {
        f(&mut self.state.lock().unwrap());
    }
}
