//! Browser leaderboard gateway
//!
//! Every call spawns a future on the page's event loop and returns at once.
//! Results only ever land in the cached top-score list; simulation state is
//! never touched from a network callback. The final score is sent with
//! `keepalive` so it still lands when it is posted from `pagehide`.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::gateway::wire::Data;
use crate::gateway::{ApiRequest, Gateway, GatewayError, TopScore};
use crate::player::PlayerId;
use crate::settings::Settings;

/// Gateway speaking the leaderboard REST API via `window.fetch`
pub struct HttpGateway {
    base_url: String,
    cache: Rc<RefCell<Vec<TopScore>>>,
}

impl HttpGateway {
    pub fn new(settings: &Settings) -> Self {
        Self {
            base_url: settings.api_url(""),
            cache: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn spawn_refresh(url: String, cache: Rc<RefCell<Vec<TopScore>>>) {
        spawn_local(async move {
            match fetch_top_scores(&url).await {
                Ok(top) => {
                    log::debug!("Fetched {} top scores", top.len());
                    *cache.borrow_mut() = top;
                }
                Err(e) => log::warn!("Error fetching top scores: {}", e),
            }
        });
    }
}

impl Gateway for HttpGateway {
    fn submit_score(&self, player: &PlayerId, score: u64) {
        let req = match ApiRequest::submit_score(player, score) {
            Ok(req) => req,
            Err(e) => {
                log::warn!("Error encoding score: {}", e);
                return;
            }
        };
        let url = self.url(req.path);
        let top_url = self.url(ApiRequest::top_scores().path);
        let cache = Rc::clone(&self.cache);
        spawn_local(async move {
            match fetch_text(&url, &req).await {
                Ok(_) => {
                    log::info!("Score {} saved", score);
                    Self::spawn_refresh(top_url, cache);
                }
                Err(e) => log::warn!("Error saving score: {}", e),
            }
        });
    }

    fn refresh_top_scores(&self) {
        Self::spawn_refresh(self.url(ApiRequest::top_scores().path), Rc::clone(&self.cache));
    }

    fn top_scores(&self) -> Vec<TopScore> {
        self.cache.borrow().clone()
    }

    fn report_position(&self, pos: Vec2) {
        let req = match ApiRequest::report_position(pos) {
            Ok(req) => req,
            Err(e) => {
                log::warn!("Error encoding ball position: {}", e);
                return;
            }
        };
        let url = self.url(req.path);
        spawn_local(async move {
            if let Err(e) = fetch_text(&url, &req).await {
                log::warn!("Error reporting ball position: {}", e);
            }
        });
    }
}

fn js_error(value: JsValue) -> GatewayError {
    GatewayError::Network(
        value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value)),
    )
}

/// Issue a request and return the body text of a 2xx response
async fn fetch_text(url: &str, req: &ApiRequest) -> Result<String, GatewayError> {
    let opts = RequestInit::new();
    opts.set_method(req.method);
    opts.set_mode(RequestMode::Cors);
    opts.set_keepalive(req.keepalive);
    if let Some(body) = &req.body {
        opts.set_body(&JsValue::from_str(body));
    }

    let request = Request::new_with_str_and_init(url, &opts).map_err(js_error)?;
    if req.body.is_some() {
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_error)?;
    }

    let window = web_sys::window().ok_or_else(|| GatewayError::Network("no window".into()))?;
    let resp: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_error)?
        .dyn_into()
        .map_err(js_error)?;
    let text = JsFuture::from(resp.text().map_err(js_error)?)
        .await
        .map_err(js_error)?
        .as_string()
        .unwrap_or_default();

    if !resp.ok() {
        return Err(GatewayError::Status {
            status: resp.status(),
            body: text,
        });
    }
    Ok(text)
}

async fn fetch_top_scores(url: &str) -> Result<Vec<TopScore>, GatewayError> {
    let text = fetch_text(url, &ApiRequest::top_scores()).await?;
    let envelope: Data<Vec<TopScore>> = serde_json::from_str(&text)?;
    Ok(envelope.data)
}
