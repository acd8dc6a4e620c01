//! Request dispatch: path → node → method table → operation → view.

use std::collections::HashMap;
use std::sync::Arc;

use nestr_core::http::header::{HeaderValue, ALLOW};
use nestr_core::http::response::{IntoResponse, Response};
use nestr_core::http::routing::any;
use nestr_core::http::{Bytes, Method, Path, RawQuery, Router, State};
use nestr_core::{default_trace, NestrConfig};
use serde_json::Value;
use tracing::{debug, warn};

use crate::accessor::DualBackendAccessor;
use crate::context::RequestContext;
use crate::error::{TreeError, ViewError};
use crate::node::{BackendKind, NodeId, ResourceTree};
use crate::operation::Scope;
use crate::response::ViewResponse;
use crate::settings::RestSettings;
use crate::view::RestView;

struct Inner {
    tree: Arc<ResourceTree>,
    views: Vec<RestView>,
    settings: RestSettings,
}

/// Owns one generated view per resource node and routes requests to them.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    pub fn new(
        tree: ResourceTree,
        accessor: DualBackendAccessor,
        settings: RestSettings,
    ) -> Result<Self, TreeError> {
        if !accessor.has_index() {
            if let Some(node) = tree
                .nodes()
                .find(|n| n.backend_kind == BackendKind::StoreWithIndexRead)
            {
                return Err(TreeError::MissingIndex(node.key.clone()));
            }
        }
        let tree = Arc::new(tree.with_prefix(&settings.prefix));
        let views = tree
            .nodes()
            .map(|node| RestView::new(tree.clone(), node.id, accessor.clone()))
            .collect();
        Ok(Self {
            inner: Arc::new(Inner {
                tree,
                views,
                settings,
            }),
        })
    }

    /// Build from the `nestr.*` configuration section, loading the resource
    /// tree from `nestr.resources.file`.
    pub fn from_config(config: &NestrConfig, accessor: DualBackendAccessor) -> Result<Self, TreeError> {
        let settings = config.section::<RestSettings>()?;
        let file = settings.resources_file.clone().ok_or_else(|| {
            TreeError::Parse("`nestr.resources.file` is not set".to_string())
        })?;
        let tree = ResourceTree::from_yaml_file(&file, settings.max_depth)?;
        Self::new(tree, accessor, settings)
    }

    pub fn tree(&self) -> &ResourceTree {
        &self.inner.tree
    }

    pub fn settings(&self) -> &RestSettings {
        &self.inner.settings
    }

    pub fn view(&self, node: NodeId) -> &RestView {
        &self.inner.views[node.index()]
    }

    pub fn view_by_key(&self, key: &str) -> Option<&RestView> {
        self.tree().find(key).map(|node| self.view(node.id))
    }

    /// A fresh context carrying the configured defaults.
    pub fn context(&self, method: Method) -> RequestContext {
        RequestContext::new(method).with_settings(&self.inner.settings)
    }

    /// Resolve `path` against the tree and run the operation `method` maps
    /// to. Path parameters are filled into `ctx`.
    pub async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        ctx: RequestContext,
    ) -> Result<ViewResponse, ViewError> {
        let matched = self
            .tree()
            .match_path(path)
            .ok_or_else(|| ViewError::NotFound(format!("no resource at {path}")))?;
        debug!(path, resource = %self.tree().node(matched.node).key, scope = ?matched.scope, "route matched");
        self.dispatch_to(matched.node, matched.scope, method, ctx.with_path_params(matched.params))
            .await
    }

    pub async fn dispatch_to(
        &self,
        node: NodeId,
        scope: Scope,
        method: &Method,
        ctx: RequestContext,
    ) -> Result<ViewResponse, ViewError> {
        let view = self.view(node);
        let scope = view.effective_scope(scope);
        let Some(op) = scope.operation_for(method) else {
            warn!(resource = %view.node().key, %method, "method outside the method tables");
            return Err(ViewError::UnsupportedMethod {
                resource: view.node().key.clone(),
                method: method.to_string(),
            });
        };
        view.invoke(op, ctx).await
    }

    async fn handle(
        &self,
        route: Route,
        method: Method,
        params: HashMap<String, String>,
        query: Option<String>,
        body: Bytes,
    ) -> Response {
        let payload = if body.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            match serde_json::from_slice::<Value>(&body) {
                Ok(value) => Some(value),
                Err(err) => return ViewError::from(err).into_response(),
            }
        };
        let mut ctx = self
            .context(method.clone())
            .with_query(query.as_deref())
            .with_path_params(params);
        if let Some(payload) = payload {
            ctx = ctx.with_payload(payload);
        }

        let Route { node, scope } = route;
        match self.dispatch_to(node, scope, &method, ctx).await {
            Ok(response) => response.into_response(),
            Err(err) if err.is_method_not_allowed() => {
                let allow = self
                    .view(node)
                    .allowed_methods(scope)
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut response = err.into_response();
                if let Ok(value) = HeaderValue::from_str(&allow) {
                    response.headers_mut().insert(ALLOW, value);
                }
                response
            }
            Err(err) => err.into_response(),
        }
    }

    /// An axum router with a route per collection path and item path,
    /// wrapped in the default trace layer. Each route is bound to its node
    /// and scope when registered.
    pub fn into_router(self) -> Router {
        let mut router = Router::new();
        for node in self.tree().nodes() {
            let paths = std::iter::once((self.tree().collection_path(node), Scope::Collection))
                .chain(self.tree().item_path(node).map(|path| (path, Scope::Item)));
            for (path, scope) in paths {
                debug!(resource = %node.key, %path, ?scope, "route registered");
                let route = Route { node: node.id, scope };
                let handler = if node.is_root() && scope == Scope::Collection {
                    any(
                        move |State(dispatcher): State<Dispatcher>,
                              method: Method,
                              RawQuery(query): RawQuery,
                              body: Bytes| async move {
                            dispatcher.handle(route, method, HashMap::new(), query, body).await
                        },
                    )
                } else {
                    any(
                        move |State(dispatcher): State<Dispatcher>,
                              method: Method,
                              Path(params): Path<HashMap<String, String>>,
                              RawQuery(query): RawQuery,
                              body: Bytes| async move {
                            dispatcher.handle(route, method, params, query, body).await
                        },
                    )
                };
                router = router.route(&path, handler);
            }
        }
        router.with_state(self).layer(default_trace())
    }
}

/// The node and scope a registered route serves.
#[derive(Debug, Clone, Copy)]
struct Route {
    node: NodeId,
    scope: Scope,
}
