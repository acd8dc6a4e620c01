//! Resource nodes and the tree they form.
//!
//! A tree is described by a flat or nested list of [`ResourceDescriptor`]s
//! (usually loaded from YAML) and compiled into an arena of
//! [`ResourceNode`]s addressed by [`NodeId`]. Parent links are plain
//! indices, so a node never owns its parent.
//!
//! ```yaml
//! - name: authors
//!   children:
//!     - name: books
//!       backend: store_with_index_read
//!     - name: profile
//!       shape: singular
//!       model: profiles
//!     - name: settings
//!       shape: attribute
//!       methods: { collection: [GET, POST] }
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use nestr_core::http::Method;
use serde::Deserialize;
use tracing::info;

use crate::error::TreeError;
use crate::operation::{allowed_operations_from_methods, Operation, Scope};

/// Structural kind of a resource, fixing its operation contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Entities addressed by id under a collection path.
    #[default]
    Collection,
    /// A one-to-one relation stored on the parent entity.
    Singular,
    /// A list or dict attribute of the parent entity, edited in place.
    Attribute,
}

impl Shape {
    /// Operations the shape can implement at all.
    pub fn supports(self, op: Operation) -> bool {
        match self {
            Shape::Collection => true,
            Shape::Singular => matches!(
                op,
                Operation::Show | Operation::Create | Operation::Update | Operation::Delete
            ),
            Shape::Attribute => matches!(op, Operation::Index | Operation::Create),
        }
    }

    fn default_operations(self) -> BTreeSet<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| self.supports(*op))
            .collect()
    }
}

/// Which backend serves the node's reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    StoreOnly,
    StoreWithIndexRead,
}

/// Declared element type of an attribute resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Integer,
    Float,
    Boolean,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeOptions {
    /// Skip appending values already present in a list attribute.
    pub unique: bool,
    pub value_type: Option<ValueType>,
}

impl Default for AttributeOptions {
    fn default() -> Self {
        Self {
            unique: true,
            value_type: None,
        }
    }
}

/// HTTP verbs declared on a collection path and on its `/{id}` item path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeclaredMethods {
    #[serde(default)]
    pub collection: Vec<String>,
    #[serde(default)]
    pub item: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// Declarative description of one resource.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDescriptor {
    pub name: String,
    /// Unique key; defaults to the dotted path of names from the root.
    #[serde(default)]
    pub key: Option<String>,
    /// Key of the parent resource. Implied for nested `children`.
    #[serde(default)]
    pub parent: Option<String>,
    /// Attribute of the parent entity holding this collection's ids.
    #[serde(default)]
    pub collection_name: Option<String>,
    #[serde(default)]
    pub id_parameter_name: Option<String>,
    /// Backend collection; defaults to `name`.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub shape: Shape,
    #[serde(default)]
    pub operations: Option<BTreeSet<Operation>>,
    #[serde(default)]
    pub methods: Option<DeclaredMethods>,
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_true")]
    pub unique: bool,
    #[serde(default)]
    pub value_type: Option<ValueType>,
    #[serde(default)]
    pub children: Vec<ResourceDescriptor>,
}

impl ResourceDescriptor {
    pub fn collection(name: impl Into<String>) -> Self {
        Self::with_shape(name, Shape::Collection)
    }

    pub fn singular(name: impl Into<String>) -> Self {
        Self::with_shape(name, Shape::Singular)
    }

    pub fn attribute(name: impl Into<String>) -> Self {
        Self::with_shape(name, Shape::Attribute)
    }

    fn with_shape(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            key: None,
            parent: None,
            collection_name: None,
            id_parameter_name: None,
            model: None,
            shape,
            operations: None,
            methods: None,
            backend: BackendKind::default(),
            unique: true,
            value_type: None,
            children: Vec::new(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn collection_name(mut self, attr: impl Into<String>) -> Self {
        self.collection_name = Some(attr.into());
        self
    }

    pub fn id_parameter_name(mut self, param: impl Into<String>) -> Self {
        self.id_parameter_name = Some(param.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn operations(mut self, ops: impl IntoIterator<Item = Operation>) -> Self {
        self.operations = Some(ops.into_iter().collect());
        self
    }

    pub fn methods(mut self, collection: &[&str], item: &[&str]) -> Self {
        self.methods = Some(DeclaredMethods {
            collection: collection.iter().map(|m| m.to_string()).collect(),
            item: item.iter().map(|m| m.to_string()).collect(),
        });
        self
    }

    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn child(mut self, child: ResourceDescriptor) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A compiled resource.
#[derive(Debug, Clone)]
pub struct ResourceNode {
    pub id: NodeId,
    pub key: String,
    pub name: String,
    pub collection_name: String,
    pub id_parameter_name: String,
    pub model: String,
    pub parent: Option<NodeId>,
    pub shape: Shape,
    pub allowed_operations: BTreeSet<Operation>,
    pub backend_kind: BackendKind,
    pub attribute: AttributeOptions,
    /// 1 for roots.
    pub depth: usize,
}

impl ResourceNode {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Entity field addressed by the id parameter: the part after the first
    /// underscore (`stories_id` → `id`).
    pub fn id_field(&self) -> &str {
        match self.id_parameter_name.split_once('_') {
            Some((_, field)) if !field.is_empty() => field,
            _ => &self.id_parameter_name,
        }
    }

    pub fn allows(&self, op: Operation) -> bool {
        self.allowed_operations.contains(&op)
    }
}

/// The path a request addressed, resolved to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch {
    pub node: NodeId,
    pub scope: Scope,
    pub params: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct ResourceTree {
    nodes: Vec<ResourceNode>,
    prefix: String,
}

struct Pending {
    key: String,
    parent_key: Option<String>,
    descriptor: ResourceDescriptor,
}

fn flatten(
    descriptors: Vec<ResourceDescriptor>,
    parent: Option<(&str, &str)>,
    out: &mut Vec<Pending>,
) {
    for mut descriptor in descriptors {
        let children = std::mem::take(&mut descriptor.children);
        let parent_key = descriptor
            .parent
            .clone()
            .or_else(|| parent.map(|(key, _)| key.to_string()));
        let key = descriptor.key.clone().unwrap_or_else(|| match parent {
            Some((_, path)) => format!("{path}.{}", descriptor.name),
            None => descriptor.name.clone(),
        });
        let path = match parent {
            Some((_, path)) => format!("{path}.{}", descriptor.name),
            None => descriptor.name.clone(),
        };
        out.push(Pending {
            key: key.clone(),
            parent_key,
            descriptor,
        });
        flatten(children, Some((&key, &path)), out);
    }
}

fn parse_methods(resource: &str, raw: &[String]) -> Result<Vec<Method>, TreeError> {
    raw.iter()
        .map(|m| {
            Method::from_bytes(m.trim().to_ascii_uppercase().as_bytes()).map_err(|_| {
                TreeError::InvalidNesting {
                    resource: resource.to_string(),
                    reason: format!("`{m}` is not an HTTP method"),
                }
            })
        })
        .collect()
}

impl ResourceTree {
    /// Compile descriptors into a tree, rejecting duplicate keys, unknown
    /// parents, cycles, shapes that cannot nest, and chains deeper than
    /// `max_depth`.
    pub fn build(descriptors: Vec<ResourceDescriptor>, max_depth: usize) -> Result<Self, TreeError> {
        let mut pending = Vec::new();
        flatten(descriptors, None, &mut pending);

        let mut by_key = HashMap::with_capacity(pending.len());
        for (index, p) in pending.iter().enumerate() {
            if by_key.insert(p.key.clone(), index).is_some() {
                return Err(TreeError::DuplicateKey(p.key.clone()));
            }
        }

        let mut parents = Vec::with_capacity(pending.len());
        for p in &pending {
            let parent = match &p.parent_key {
                Some(parent) => Some(*by_key.get(parent).ok_or_else(|| TreeError::UnknownParent {
                    resource: p.key.clone(),
                    parent: parent.clone(),
                })?),
                None => None,
            };
            parents.push(parent);
        }

        let mut depths = Vec::with_capacity(pending.len());
        for (index, p) in pending.iter().enumerate() {
            let mut seen = HashSet::from([index]);
            let mut depth = 1;
            let mut cursor = parents[index];
            while let Some(ancestor) = cursor {
                if !seen.insert(ancestor) {
                    return Err(TreeError::Cycle(p.key.clone()));
                }
                depth += 1;
                cursor = parents[ancestor];
            }
            if depth > max_depth {
                return Err(TreeError::TooDeep {
                    resource: p.key.clone(),
                    depth,
                    max: max_depth,
                });
            }
            depths.push(depth);
        }

        let mut nodes = Vec::with_capacity(pending.len());
        for (index, p) in pending.iter().enumerate() {
            let d = &p.descriptor;
            let parent = parents[index];

            if let Some(parent) = parent {
                let parent_shape = pending[parent].descriptor.shape;
                if parent_shape != Shape::Collection {
                    return Err(TreeError::InvalidNesting {
                        resource: p.key.clone(),
                        reason: format!("parent `{}` is not a collection", pending[parent].key),
                    });
                }
            } else if d.shape != Shape::Collection {
                return Err(TreeError::InvalidNesting {
                    resource: p.key.clone(),
                    reason: "singular and attribute resources need a parent".to_string(),
                });
            }

            let allowed_operations = match (&d.operations, &d.methods) {
                (Some(ops), _) => ops.clone(),
                (None, Some(methods)) => allowed_operations_from_methods(
                    &parse_methods(&p.key, &methods.collection)?,
                    &parse_methods(&p.key, &methods.item)?,
                    d.shape == Shape::Singular,
                ),
                (None, None) => d.shape.default_operations(),
            };

            let model = match (d.shape, parent) {
                (Shape::Attribute, Some(parent)) => pending[parent]
                    .descriptor
                    .model
                    .clone()
                    .unwrap_or_else(|| pending[parent].descriptor.name.clone()),
                _ => d.model.clone().unwrap_or_else(|| d.name.clone()),
            };

            let node = ResourceNode {
                id: NodeId(index),
                key: p.key.clone(),
                name: d.name.clone(),
                collection_name: d.collection_name.clone().unwrap_or_else(|| d.name.clone()),
                id_parameter_name: d
                    .id_parameter_name
                    .clone()
                    .unwrap_or_else(|| format!("{}_id", d.name)),
                model,
                parent: parent.map(NodeId),
                shape: d.shape,
                allowed_operations,
                backend_kind: d.backend,
                attribute: AttributeOptions {
                    unique: d.unique,
                    value_type: d.value_type,
                },
                depth: depths[index],
            };
            info!(
                resource = %node.key,
                shape = ?node.shape,
                backend = ?node.backend_kind,
                depth = node.depth,
                operations = ?node.allowed_operations,
                "Registered resource"
            );
            nodes.push(node);
        }

        let tree = Self {
            nodes,
            prefix: String::new(),
        };
        tree.check_parameters()?;
        Ok(tree)
    }

    pub fn from_yaml_str(yaml: &str, max_depth: usize) -> Result<Self, TreeError> {
        let descriptors: Vec<ResourceDescriptor> = serde_yaml::from_str(yaml)?;
        Self::build(descriptors, max_depth)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>, max_depth: usize) -> Result<Self, TreeError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| TreeError::Parse(format!("{}: {e}", path.display())))?;
        Self::from_yaml_str(&yaml, max_depth)
    }

    /// Mount every path under `prefix` (e.g. `/api`).
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.trim_end_matches('/').to_string();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn check_parameters(&self) -> Result<(), TreeError> {
        let mut siblings = HashSet::new();
        for node in &self.nodes {
            if !siblings.insert((node.parent, node.name.as_str())) {
                return Err(TreeError::InvalidNesting {
                    resource: node.key.clone(),
                    reason: format!("a sibling is already named `{}`", node.name),
                });
            }
        }
        for node in self.nodes.iter().filter(|n| n.shape == Shape::Collection) {
            let clash = self
                .ancestors(node)
                .into_iter()
                .any(|a| a.id_parameter_name == node.id_parameter_name);
            if clash {
                return Err(TreeError::DuplicateParameter {
                    resource: node.key.clone(),
                    parameter: node.id_parameter_name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> &ResourceNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find(&self, key: &str) -> Option<&ResourceNode> {
        self.nodes.iter().find(|n| n.key == key)
    }

    pub fn parent(&self, node: &ResourceNode) -> Option<&ResourceNode> {
        node.parent.map(|id| self.node(id))
    }

    pub fn children(&self, node: &ResourceNode) -> impl Iterator<Item = &ResourceNode> {
        let id = node.id;
        self.nodes.iter().filter(move |n| n.parent == Some(id))
    }

    /// Ancestors of `node`, root first.
    pub fn ancestors(&self, node: &ResourceNode) -> Vec<&ResourceNode> {
        let mut chain = Vec::with_capacity(node.depth.saturating_sub(1));
        let mut cursor = self.parent(node);
        while let Some(ancestor) = cursor {
            chain.push(ancestor);
            cursor = self.parent(ancestor);
        }
        chain.reverse();
        chain
    }

    /// Route template of the node itself, e.g. `/authors/{authors_id}/books`.
    pub fn collection_path(&self, node: &ResourceNode) -> String {
        let mut path = self.prefix.clone();
        for segment in self.ancestors(node).into_iter().chain(std::iter::once(node)) {
            path.push('/');
            path.push_str(&segment.name);
            if segment.id != node.id {
                path.push_str("/{");
                path.push_str(&segment.id_parameter_name);
                path.push('}');
            }
        }
        path
    }

    /// Route template of a single entity; only collections have one.
    pub fn item_path(&self, node: &ResourceNode) -> Option<String> {
        (node.shape == Shape::Collection).then(|| {
            format!("{}/{{{}}}", self.collection_path(node), node.id_parameter_name)
        })
    }

    /// Concrete path of `node`'s entity `id` (or of the node itself when
    /// `id` is `None`), with ancestor ids taken from `params`.
    pub fn location(&self, node: &ResourceNode, params: &HashMap<String, String>, id: Option<&str>) -> String {
        let mut path = self.prefix.clone();
        for segment in self.ancestors(node) {
            path.push('/');
            path.push_str(&segment.name);
            path.push('/');
            path.push_str(
                params
                    .get(&segment.id_parameter_name)
                    .map(String::as_str)
                    .unwrap_or_default(),
            );
        }
        path.push('/');
        path.push_str(&node.name);
        if let Some(id) = id {
            path.push('/');
            path.push_str(id);
        }
        path
    }

    /// Resolve a concrete request path to a node and the scope it addresses.
    pub fn match_path(&self, path: &str) -> Option<PathMatch> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        let mut segments = rest.split('/').filter(|s| !s.is_empty()).peekable();
        let mut params = HashMap::new();
        let mut parent: Option<NodeId> = None;

        loop {
            let name = segments.next()?;
            let node = self
                .nodes
                .iter()
                .find(|n| n.parent == parent && n.name == name)?;
            let Some(id) = segments.next() else {
                return Some(PathMatch {
                    node: node.id,
                    scope: Scope::Collection,
                    params,
                });
            };
            if node.shape != Shape::Collection {
                return None;
            }
            params.insert(node.id_parameter_name.clone(), id.to_string());
            if segments.peek().is_none() {
                return Some(PathMatch {
                    node: node.id,
                    scope: Scope::Item,
                    params,
                });
            }
            parent = Some(node.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> ResourceTree {
        ResourceTree::build(
            vec![ResourceDescriptor::collection("authors")
                .child(
                    ResourceDescriptor::collection("books")
                        .backend(BackendKind::StoreWithIndexRead)
                        .child(ResourceDescriptor::collection("chapters")),
                )
                .child(ResourceDescriptor::singular("profile").model("profiles"))
                .child(ResourceDescriptor::attribute("tags"))],
            8,
        )
        .unwrap()
    }

    #[test]
    fn defaults_follow_names() {
        let tree = library();
        let books = tree.find("authors.books").unwrap();
        assert_eq!(books.id_parameter_name, "books_id");
        assert_eq!(books.id_field(), "id");
        assert_eq!(books.collection_name, "books");
        assert_eq!(books.model, "books");
        assert_eq!(books.depth, 2);
        assert_eq!(tree.find("authors.tags").unwrap().model, "authors");
        assert_eq!(tree.find("authors.profile").unwrap().model, "profiles");
    }

    #[test]
    fn id_field_is_suffix_after_first_underscore() {
        let tree = ResourceTree::build(
            vec![ResourceDescriptor::collection("users").id_parameter_name("users_user_name")],
            8,
        )
        .unwrap();
        assert_eq!(tree.find("users").unwrap().id_field(), "user_name");
    }

    #[test]
    fn shape_defaults_for_operations() {
        let tree = library();
        assert_eq!(tree.find("authors").unwrap().allowed_operations.len(), 7);
        let profile = tree.find("authors.profile").unwrap();
        assert!(profile.allows(Operation::Show));
        assert!(!profile.allows(Operation::Index));
        let tags = tree.find("authors.tags").unwrap();
        assert_eq!(
            tags.allowed_operations.iter().copied().collect::<Vec<_>>(),
            vec![Operation::Index, Operation::Create]
        );
    }

    #[test]
    fn declared_methods_become_operations() {
        let tree = ResourceTree::build(
            vec![ResourceDescriptor::collection("stories").methods(&["get", "post"], &["GET"])],
            8,
        )
        .unwrap();
        let ops = &tree.find("stories").unwrap().allowed_operations;
        assert_eq!(
            ops.iter().copied().collect::<Vec<_>>(),
            vec![Operation::Index, Operation::Show, Operation::Create]
        );
    }

    #[test]
    fn paths_and_locations() {
        let tree = library().with_prefix("/api/");
        let chapters = tree.find("authors.books.chapters").unwrap();
        assert_eq!(
            tree.collection_path(chapters),
            "/api/authors/{authors_id}/books/{books_id}/chapters"
        );
        assert_eq!(
            tree.item_path(chapters).unwrap(),
            "/api/authors/{authors_id}/books/{books_id}/chapters/{chapters_id}"
        );
        assert!(tree.item_path(tree.find("authors.profile").unwrap()).is_none());

        let params = HashMap::from([
            ("authors_id".to_string(), "a1".to_string()),
            ("books_id".to_string(), "b2".to_string()),
        ]);
        assert_eq!(
            tree.location(chapters, &params, Some("c9")),
            "/api/authors/a1/books/b2/chapters/c9"
        );
    }

    #[test]
    fn matches_paths() {
        let tree = library();
        let m = tree.match_path("/authors/a1/books").unwrap();
        assert_eq!(tree.node(m.node).key, "authors.books");
        assert_eq!(m.scope, Scope::Collection);
        assert_eq!(m.params["authors_id"], "a1");

        let m = tree.match_path("/authors/a1/books/b2/").unwrap();
        assert_eq!(m.scope, Scope::Item);
        assert_eq!(m.params["books_id"], "b2");

        let m = tree.match_path("/authors/a1/profile").unwrap();
        assert_eq!(tree.node(m.node).key, "authors.profile");

        assert!(tree.match_path("/authors/a1/profile/p1").is_none());
        assert!(tree.match_path("/publishers").is_none());
        assert!(tree.match_path("/").is_none());
    }

    #[test]
    fn rejects_cycles() {
        let err = ResourceTree::build(
            vec![
                ResourceDescriptor::collection("a").parent("b"),
                ResourceDescriptor::collection("b").parent("a"),
            ],
            8,
        )
        .unwrap_err();
        assert!(matches!(err, TreeError::Cycle(_)));
    }

    #[test]
    fn rejects_unknown_parent_and_duplicates() {
        let err = ResourceTree::build(vec![ResourceDescriptor::collection("a").parent("zzz")], 8)
            .unwrap_err();
        assert!(matches!(err, TreeError::UnknownParent { .. }));

        let err = ResourceTree::build(
            vec![ResourceDescriptor::collection("a"), ResourceDescriptor::collection("a")],
            8,
        )
        .unwrap_err();
        assert!(matches!(err, TreeError::DuplicateKey(_)));
    }

    #[test]
    fn enforces_depth_limit() {
        let deep = ResourceDescriptor::collection("a").child(
            ResourceDescriptor::collection("b").child(ResourceDescriptor::collection("c")),
        );
        let err = ResourceTree::build(vec![deep.clone()], 2).unwrap_err();
        assert!(matches!(err, TreeError::TooDeep { depth: 3, max: 2, .. }));
        assert!(ResourceTree::build(vec![deep], 3).is_ok());
    }

    #[test]
    fn rejects_children_of_singular() {
        let err = ResourceTree::build(
            vec![ResourceDescriptor::collection("users")
                .child(ResourceDescriptor::singular("profile").child(ResourceDescriptor::collection("x")))],
            8,
        )
        .unwrap_err();
        assert!(matches!(err, TreeError::InvalidNesting { .. }));

        let err = ResourceTree::build(vec![ResourceDescriptor::attribute("tags")], 8).unwrap_err();
        assert!(matches!(err, TreeError::InvalidNesting { .. }));
    }

    #[test]
    fn rejects_sibling_name_clash() {
        let err = ResourceTree::build(
            vec![
                ResourceDescriptor::collection("users"),
                ResourceDescriptor::collection("users").key("people"),
            ],
            8,
        )
        .unwrap_err();
        assert!(matches!(err, TreeError::InvalidNesting { .. }));
    }

    #[test]
    fn rejects_reused_parameter() {
        let err = ResourceTree::build(
            vec![ResourceDescriptor::collection("comments")
                .child(ResourceDescriptor::collection("comments"))],
            8,
        )
        .unwrap_err();
        assert!(matches!(err, TreeError::DuplicateParameter { .. }));
    }

    #[test]
    fn loads_yaml() {
        let tree = ResourceTree::from_yaml_str(
            r#"
- name: authors
  children:
    - name: books
      backend: store_with_index_read
      operations: [index, show]
    - name: settings
      shape: attribute
      value_type: string
      unique: false
"#,
            8,
        )
        .unwrap();
        let books = tree.find("authors.books").unwrap();
        assert_eq!(books.backend_kind, BackendKind::StoreWithIndexRead);
        assert_eq!(books.allowed_operations.len(), 2);
        let settings = tree.find("authors.settings").unwrap();
        assert!(!settings.attribute.unique);
        assert_eq!(settings.attribute.value_type, Some(ValueType::String));
    }
}
