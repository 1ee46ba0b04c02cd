use crate::config::{Config, credentials_path, token_path};
use crate::error::SyncError;
use crate::models::{Task, TaskList, TaskStatus};
use crate::sync::RemoteTaskSource;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use log::{debug, info, warn};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::thread;
use std::time::Duration as StdDuration;

const OAUTH_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const TASKS_API: &str = "https://tasks.googleapis.com/tasks/v1";
const TASKS_SCOPE: &str = "https://www.googleapis.com/auth/tasks";
const PAGE_SIZE: &str = "100";
const AUTH_WINDOW_MINUTES: i64 = 10;
const EXPIRY_MARGIN_SECONDS: i64 = 60;

#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

#[derive(Deserialize, Clone, Debug)]
struct ClientSecrets {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    auth_uri: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

impl ClientSecrets {
    fn auth_uri(&self) -> &str {
        self.auth_uri.as_deref().unwrap_or(OAUTH_AUTH_URL)
    }

    fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(OAUTH_TOKEN_URL)
    }
}

/// Authorized-user file, readable and writable by google-auth as well.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
struct StoredToken {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    client_secret: Option<String>,
    #[serde(default)]
    scopes: Vec<String>,
    #[serde(default)]
    expiry: Option<String>,
    #[serde(flatten)]
    extra: HashMap<String, serde_json::Value>,
}

impl StoredToken {
    /// Usable access token: present and not within a minute of expiry.
    /// A token without an expiry never expires.
    fn access_token_at(&self, now: DateTime<Utc>) -> Option<&str> {
        let token = self.token.as_deref().filter(|t| !t.is_empty())?;
        match self.expiry.as_deref() {
            None => Some(token),
            Some(raw) => {
                let expiry = DateTime::parse_from_rfc3339(raw).ok()?;
                (expiry.with_timezone(&Utc) > now + Duration::seconds(EXPIRY_MARGIN_SECONDS))
                    .then_some(token)
            }
        }
    }

    fn apply(&mut self, response: TokenResponse, now: DateTime<Utc>) {
        self.token = Some(response.access_token);
        if let Some(refresh) = response.refresh_token {
            self.refresh_token = Some(refresh);
        }
        self.expiry = Some(
            (now + Duration::seconds(response.expires_in as i64))
                .to_rfc3339_opts(SecondsFormat::Micros, true),
        );
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
    refresh_token: Option<String>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

#[derive(Deserialize)]
struct Page<T> {
    items: Option<Vec<T>>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Deserialize, Clone)]
struct RemoteTaskList {
    id: String,
    title: Option<String>,
}

#[derive(Deserialize, Clone)]
struct RemoteTask {
    id: String,
    title: Option<String>,
    notes: Option<String>,
    status: Option<String>,
    completed: Option<String>,
}

impl RemoteTask {
    fn into_task(self, list_id: &str) -> Task {
        Task {
            id: self.id,
            list_id: list_id.to_string(),
            title: self.title,
            notes: self.notes,
            status: TaskStatus::from_api(self.status.as_deref()),
            completed_at: self.completed,
        }
    }
}

#[derive(Serialize)]
struct TaskStatusUpdate<'a> {
    status: &'a str,
}

/// Google Tasks for one authorized account.
pub struct GoogleTasks {
    client: Client,
    access_token: String,
}

impl GoogleTasks {
    pub fn new(access_token: String) -> Self {
        Self {
            client: Client::new(),
            access_token,
        }
    }

    /// Loads, refreshes or interactively obtains the account's credential.
    pub fn authorize(config: &Config, email: &str) -> Result<Self, SyncError> {
        let access_token = ensure_access_token(config, email)?;
        Ok(Self::new(access_token))
    }

    fn get_all<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<Vec<T>, SyncError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .client
                .get(url)
                .bearer_auth(&self.access_token)
                .query(query)
                .query(&[("maxResults", PAGE_SIZE)]);
            if let Some(token) = page_token.as_deref() {
                request = request.query(&[("pageToken", token)]);
            }
            let resp = request
                .send()
                .map_err(|e| SyncError::Request(e.to_string()))?;
            check_status(resp.status(), what)?;

            let page: Page<T> = resp
                .json()
                .map_err(|e| SyncError::Request(e.to_string()))?;
            items.extend(page.items.unwrap_or_default());
            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => return Ok(items),
            }
        }
    }
}

impl RemoteTaskSource for GoogleTasks {
    fn list_task_lists(&self) -> Result<Vec<TaskList>, SyncError> {
        let url = format!("{TASKS_API}/users/@me/lists");
        let lists: Vec<RemoteTaskList> = self.get_all(&url, &[], "Task lists")?;
        Ok(lists
            .into_iter()
            .map(|list| TaskList {
                title: list.title.unwrap_or_default(),
                id: list.id,
            })
            .collect())
    }

    fn list_tasks(&self, list_id: &str) -> Result<Vec<Task>, SyncError> {
        let url = format!("{TASKS_API}/lists/{list_id}/tasks");
        let tasks: Vec<RemoteTask> =
            self.get_all(&url, &[("showCompleted", "true")], "Tasks list")?;
        Ok(tasks
            .into_iter()
            .map(|task| task.into_task(list_id))
            .collect())
    }

    fn complete_task(&self, task: &Task) -> Result<(), SyncError> {
        let url = format!("{TASKS_API}/lists/{}/tasks/{}", task.list_id, task.id);
        let resp = self
            .client
            .patch(url)
            .bearer_auth(&self.access_token)
            .json(&TaskStatusUpdate {
                status: "completed",
            })
            .send()
            .map_err(|e| SyncError::Request(e.to_string()))?;
        check_status(resp.status(), "Task update")
    }
}

/// A rejected access token is an authorization problem, not a lookup failure.
fn check_status(status: StatusCode, what: &str) -> Result<(), SyncError> {
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(SyncError::Authorization(format!(
            "{what} rejected the access token: HTTP {status}"
        )));
    }
    Err(SyncError::Request(format!("{what} failed: HTTP {status}")))
}

fn ensure_access_token(config: &Config, email: &str) -> Result<String, SyncError> {
    let token_path = token_path(config, email);
    let stored = if token_path.exists() {
        Some(load_token(&token_path)?)
    } else {
        None
    };

    if let Some(token) = stored.as_ref().and_then(|t| t.access_token_at(Utc::now())) {
        return Ok(token.to_string());
    }

    let secrets = load_client_secrets(&credentials_path(config))?;
    let client = Client::new();

    if let Some(mut stored) = stored
        && let Some(refresh) = stored.refresh_token.clone()
    {
        match refresh_access_token(&client, &secrets, &stored, &refresh) {
            Ok(response) => {
                stored.apply(response, Utc::now());
                save_token(&token_path, &stored)?;
                info!("Refreshed Google credential for {email}.");
                if let Some(token) = stored.token {
                    return Ok(token);
                }
            }
            Err(err) => warn!("Could not refresh credential for {email}: {}", err.message()),
        }
    }

    let stored = run_local_oauth_flow(&client, &secrets, email)?;
    save_token(&token_path, &stored)?;
    stored
        .token
        .ok_or_else(|| SyncError::Authorization("token endpoint returned no access token".to_string()))
}

fn refresh_access_token(
    client: &Client,
    secrets: &ClientSecrets,
    stored: &StoredToken,
    refresh_token: &str,
) -> Result<TokenResponse, SyncError> {
    let client_id = stored.client_id.as_deref().unwrap_or(&secrets.client_id);
    let client_secret = stored
        .client_secret
        .as_deref()
        .unwrap_or(&secrets.client_secret);
    let token_uri = stored.token_uri.as_deref().unwrap_or(secrets.token_uri());

    let resp = client
        .post(token_uri)
        .form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .send()
        .map_err(|e| SyncError::Authorization(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        return Err(SyncError::Authorization(format!(
            "Token refresh failed: {}",
            format_oauth_error(status, &body)
        )));
    }

    resp.json()
        .map_err(|e| SyncError::Authorization(e.to_string()))
}

/// Installed-app loopback flow: open the consent page, wait for the
/// redirect on 127.0.0.1, exchange the code.
fn run_local_oauth_flow(
    client: &Client,
    secrets: &ClientSecrets,
    email: &str,
) -> Result<StoredToken, SyncError> {
    let listener =
        TcpListener::bind("127.0.0.1:0").map_err(|e| SyncError::Authorization(e.to_string()))?;
    let addr = listener
        .local_addr()
        .map_err(|e| SyncError::Authorization(e.to_string()))?;
    let redirect_uri = format!("http://{}/", addr);
    let state = generate_state();
    let auth_url = build_auth_url(secrets, &redirect_uri, &state, email)?;

    warn!("Authorization required for {email}. Open this URL to continue: {auth_url}");
    if let Err(err) = open::that(&auth_url) {
        warn!("Could not open a browser: {err}");
    }

    let code = wait_for_code(&listener, &state)?;

    let resp = client
        .post(secrets.token_uri())
        .form(&[
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("code", code.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .map_err(|e| SyncError::Authorization(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        return Err(SyncError::Authorization(format_oauth_error(status, &body)));
    }

    let response: TokenResponse = resp
        .json()
        .map_err(|e| SyncError::Authorization(e.to_string()))?;
    if response.refresh_token.is_none() {
        warn!("Google returned no refresh token for {email}; the next expiry will prompt again.");
    }

    let mut stored = StoredToken {
        token_uri: Some(secrets.token_uri().to_string()),
        client_id: Some(secrets.client_id.clone()),
        client_secret: Some(secrets.client_secret.clone()),
        scopes: vec![TASKS_SCOPE.to_string()],
        ..StoredToken::default()
    };
    stored.apply(response, Utc::now());
    info!("Authorization complete for {email}.");
    Ok(stored)
}

fn build_auth_url(
    secrets: &ClientSecrets,
    redirect_uri: &str,
    state: &str,
    email: &str,
) -> Result<String, SyncError> {
    Url::parse_with_params(
        secrets.auth_uri(),
        [
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", TASKS_SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("login_hint", email),
            ("state", state),
        ],
    )
    .map(|url| url.to_string())
    .map_err(|e| SyncError::Authorization(e.to_string()))
}

fn wait_for_code(listener: &TcpListener, state: &str) -> Result<String, SyncError> {
    let deadline = Utc::now() + Duration::minutes(AUTH_WINDOW_MINUTES);
    listener
        .set_nonblocking(true)
        .map_err(|e| SyncError::Authorization(e.to_string()))?;

    loop {
        if Utc::now() >= deadline {
            return Err(SyncError::Authorization(
                "Google auth expired. Please retry.".to_string(),
            ));
        }

        match listener.accept() {
            Ok((mut stream, _addr)) => {
                let request_path = read_request_path(&mut stream)?;
                let result = parse_redirect(&request_path, state);
                let message = match &result {
                    Ok(_) => "Authorization complete. You can close this window.".to_string(),
                    Err(err) => err.message(),
                };
                if let Err(err) = respond_with_message(&mut stream, &message) {
                    debug!("Could not answer the browser: {err}");
                }
                return result;
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(StdDuration::from_millis(200));
            }
            Err(err) => return Err(SyncError::Authorization(err.to_string())),
        }
    }
}

fn read_request_path(stream: &mut TcpStream) -> Result<String, SyncError> {
    stream
        .set_nonblocking(false)
        .and_then(|_| stream.set_read_timeout(Some(StdDuration::from_secs(2))))
        .map_err(|e| SyncError::Authorization(e.to_string()))?;

    let mut buf = [0u8; 8192];
    let mut len = 0;
    while len < buf.len() {
        match stream.read(&mut buf[len..]) {
            Ok(0) => break,
            Ok(n) => {
                len += n;
                if buf[..len].windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                break;
            }
            Err(err) => return Err(SyncError::Authorization(err.to_string())),
        }
    }

    let request = String::from_utf8_lossy(&buf[..len]);
    let request_line = request.lines().next().unwrap_or("");
    Ok(request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string())
}

/// Extracts the authorization code from the redirect's request target.
fn parse_redirect(path: &str, expected_state: &str) -> Result<String, SyncError> {
    let url = Url::parse("http://127.0.0.1")
        .and_then(|base| base.join(path))
        .map_err(|e| SyncError::Authorization(e.to_string()))?;
    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

    if let Some(error) = params.get("error") {
        let desc = params
            .get("error_description")
            .map(|s| format!(" ({})", s))
            .unwrap_or_default();
        return Err(SyncError::Authorization(format!("{error}{desc}")));
    }

    let Some(code) = params.get("code") else {
        return Err(SyncError::Authorization(
            "Missing authorization code from Google.".to_string(),
        ));
    };

    if params.get("state").map(String::as_str) != Some(expected_state) {
        return Err(SyncError::Authorization(
            "Invalid OAuth state. Please retry.".to_string(),
        ));
    }

    Ok(code.clone())
}

fn respond_with_message(stream: &mut TcpStream, message: &str) -> io::Result<()> {
    let body = format!("{message}\n");
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    stream.write_all(response.as_bytes())
}

fn generate_state() -> String {
    use rand::{Rng, distributions::Alphanumeric};
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

fn format_oauth_error(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return format!("HTTP {}", status);
    }

    let summary = if let Ok(err) = serde_json::from_str::<TokenErrorResponse>(trimmed) {
        if let Some(desc) = err.error_description {
            format!("{} ({})", desc, err.error)
        } else {
            err.error
        }
    } else {
        truncate_error(trimmed)
    };
    format!("HTTP {}: {}", status, summary)
}

fn truncate_error(message: &str) -> String {
    let mut out = message.replace(['\n', '\r'], " ");
    if out.len() > 240 {
        let mut cut = 240;
        while !out.is_char_boundary(cut) {
            cut -= 1;
        }
        out.truncate(cut);
        out.push_str("...");
    }
    out
}

fn load_client_secrets(path: &Path) -> Result<ClientSecrets, SyncError> {
    let content = fs::read_to_string(path).map_err(|e| {
        SyncError::Authorization(format!("cannot read {}: {e}", path.display()))
    })?;
    parse_client_secrets(&content)
}

fn parse_client_secrets(content: &str) -> Result<ClientSecrets, SyncError> {
    let file: ClientSecretsFile = serde_json::from_str(content)
        .map_err(|e| SyncError::Authorization(format!("invalid client secrets: {e}")))?;
    file.installed.or(file.web).ok_or_else(|| {
        SyncError::Authorization("client secrets need an \"installed\" or \"web\" entry".to_string())
    })
}

fn load_token(path: &Path) -> Result<StoredToken, SyncError> {
    let content = fs::read_to_string(path)?;
    let token: StoredToken = serde_json::from_str(&content)
        .map_err(|e| SyncError::Authorization(format!("invalid {}: {e}", path.display())))?;
    Ok(token)
}

fn save_token(path: &Path, token: &StoredToken) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(token)
        .map_err(|e| SyncError::Authorization(e.to_string()))?;
    fs::write(path, content)?;
    Ok(())
}
