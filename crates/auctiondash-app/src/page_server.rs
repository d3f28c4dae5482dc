// HTTP server for the dashboard page itself.
//
// Serves one HTML document; all data arrives afterwards over the WebSocket.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use warp::Filter;

const INDEX_TEMPLATE: &str = include_str!("../assets/index.html");

/// Fill the page template with the tab title and the WebSocket port.
pub fn render_index(title: &str, ws_port: u16) -> String {
    INDEX_TEMPLATE
        .replace("{{TITLE}}", &escape_html(title))
        .replace("{{WS_PORT}}", &ws_port.to_string())
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// `GET /` returns the rendered page; everything else is a 404.
pub fn routes(
    page: String,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let page = Arc::new(page);
    warp::path::end()
        .and(warp::get())
        .map(move || warp::reply::html(page.as_str().to_owned()))
}

/// Bind the page server. Returns the bound address and the future that
/// serves requests; the caller decides where to run it.
pub fn bind(
    addr: SocketAddr,
    page: String,
) -> anyhow::Result<(SocketAddr, impl Future<Output = ()> + Send + 'static)> {
    let (bound, server) = warp::serve(routes(page)).try_bind_ephemeral(addr)?;
    Ok((bound, server))
}
