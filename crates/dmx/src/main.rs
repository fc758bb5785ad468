//! dmx CLI
//!
//! Builds a router from route definitions and dispatches requests against
//! it, printing the resulting status. Handy for checking how a route table
//! resolves a path.

use std::str::FromStr;

use clap::Parser;
use serde::Serialize;
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

use dmx::{Method, PathParams, PlainNotFound, Request, Response, Router};

/// Routes used when none are given.
const DEFAULT_ROUTES: &[&str] = &[
    "PUT,PATCH /posts/:post_id/comments/:id",
    "POST,GET /posts/:post_id/comments",
    "PUT,PATCH /posts/:id",
    "POST,GET /posts",
    "GET /",
];

/// Resolve requests against a route table.
#[derive(Parser)]
#[command(name = "dmx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Route definition such as "PUT,PATCH /posts/:id" (repeatable).
    #[arg(short, long = "route", env = "DMX_ROUTES", value_delimiter = ';')]
    routes: Vec<RouteDef>,

    /// Answer 404 for every unmatched request, never 405.
    #[arg(long)]
    plain_not_found: bool,

    /// Print one JSON object per request instead of log lines.
    #[arg(long)]
    json: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Request method.
    method: String,

    /// One or more request paths.
    #[arg(required = true)]
    paths: Vec<String>,
}

/// A `METHOD[,METHOD...] PATTERN` route definition.
#[derive(Debug, Clone)]
struct RouteDef {
    methods: Vec<Method>,
    pattern: String,
}

impl FromStr for RouteDef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (methods, pattern) = s
            .trim()
            .split_once(char::is_whitespace)
            .ok_or_else(|| format!("expected \"METHODS PATTERN\", got {s:?}"))?;

        let methods: Vec<Method> = methods
            .split(',')
            .filter(|m| !m.is_empty())
            .map(Method::from)
            .collect();
        if methods.is_empty() {
            return Err(format!("no method in route {s:?}"));
        }

        Ok(Self {
            methods,
            pattern: pattern.trim().to_string(),
        })
    }
}

/// What happened to one request.
#[derive(Debug, Serialize)]
struct Outcome<'a> {
    method: &'a Method,
    path: &'a str,
    status: u16,
    /// The matched pattern, absent when the fallback answered.
    pattern: Option<&'a str>,
    params: PathParams,
    body: String,
}

/// Dispatches one request and records the outcome.
async fn resolve<'a>(router: &'a Router, method: &'a Method, path: &'a str) -> Outcome<'a> {
    let (pattern, params) = router
        .match_request(method, path)
        .map_or((None, PathParams::new()), |(resource, params)| {
            (Some(resource.pattern()), params)
        });
    let res = router.handle(Request::new(method.clone(), path)).await;

    Outcome {
        method,
        path,
        status: res.status,
        pattern,
        params,
        body: res.body_string().unwrap_or_default(),
    }
}

fn build_router(routes: &[RouteDef], plain_not_found: bool) -> dmx::Result<Router> {
    let mut router = if plain_not_found {
        Router::new().not_found_handler(PlainNotFound)
    } else {
        Router::new()
    };

    for route in routes {
        let pattern = route.pattern.clone();
        router.add_fn(
            &route.pattern,
            move |req: Request| {
                let pattern = pattern.clone();
                async move {
                    let mut params: Vec<_> = req
                        .params
                        .iter()
                        .map(|(k, v)| format!("{k}={v}"))
                        .collect();
                    params.sort();
                    Response::text(format!("{pattern} {}", params.join("&")))
                }
            },
            &route.methods,
        )?;
    }

    Ok(router)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let routes = if cli.routes.is_empty() {
        DEFAULT_ROUTES
            .iter()
            .map(|r| r.parse())
            .collect::<Result<Vec<RouteDef>, _>>()
            .map_err(anyhow::Error::msg)?
    } else {
        cli.routes
    };
    debug!(count = routes.len(), "building router");

    // A duplicate route aborts startup.
    let router = build_router(&routes, cli.plain_not_found)?;

    let method = Method::from(cli.method.as_str());
    for path in &cli.paths {
        let outcome = resolve(&router, &method, path).await;
        if cli.json {
            println!("{}", serde_json::to_string(&outcome)?);
        } else {
            info!("{method} {path} -> {} {}", outcome.status, outcome.body);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_route_def() {
        let def: RouteDef = "PUT,PATCH /posts/:id".parse().unwrap();
        assert_eq!(def.methods, vec![Method::Put, Method::Patch]);
        assert_eq!(def.pattern, "/posts/:id");
    }

    #[test]
    fn test_parse_route_def_without_pattern() {
        assert!("GET".parse::<RouteDef>().is_err());
        assert!(", /posts".parse::<RouteDef>().is_err());
    }

    #[test]
    fn test_default_routes_build() {
        let routes: Vec<RouteDef> = DEFAULT_ROUTES.iter().map(|r| r.parse().unwrap()).collect();
        let router = build_router(&routes, false).unwrap();
        assert!(router.dispatch(&Method::Patch, "/posts/1").is_matched());
    }

    #[test]
    fn test_duplicate_route_aborts() {
        let routes: Vec<RouteDef> = ["GET /posts", "GET /posts/"]
            .iter()
            .map(|r| r.parse().unwrap())
            .collect();
        let err = build_router(&routes, false).unwrap_err();
        assert_eq!(err.to_string(), "mux: GET /posts is already defined");
    }

    #[tokio::test]
    async fn test_handler_echoes_params() {
        let routes: Vec<RouteDef> = vec!["GET /posts/:post_id/tags/:id".parse().unwrap()];
        let router = build_router(&routes, true).unwrap();

        let res = router.handle(Request::get("/posts/1/tags/2")).await;
        assert_eq!(
            res.body_string(),
            Some("/posts/:post_id/tags/:id id=2&post_id=1".to_string())
        );

        let res = router.handle(Request::post("/posts/1/tags/2")).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn test_outcome_serializes_match() {
        let routes: Vec<RouteDef> = vec!["PUT,PATCH /posts/:id".parse().unwrap()];
        let router = build_router(&routes, false).unwrap();

        let outcome = resolve(&router, &Method::Patch, "/posts/7").await;
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["method"], "PATCH");
        assert_eq!(value["status"], 200);
        assert_eq!(value["pattern"], "/posts/:id");
        assert_eq!(value["params"]["id"], "7");
    }

    #[tokio::test]
    async fn test_outcome_serializes_fallback() {
        let routes: Vec<RouteDef> = vec!["GET /posts".parse().unwrap()];
        let router = build_router(&routes, false).unwrap();

        let outcome = resolve(&router, &Method::Delete, "/posts").await;
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], 405);
        assert!(value["pattern"].is_null());
        assert_eq!(value["params"], serde_json::json!({}));
    }
}
