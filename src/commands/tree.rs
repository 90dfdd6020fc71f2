//! Command trees: nodes, merging and the build/freeze lifecycle
//!
//!     A tree is made of [`CommandNode`]s of three kinds: `Root` (matches nothing, used for the
//!     tree root and for executable leaves), `Literal` (a fixed token) and `Argument` (a value
//!     parser, optionally skippable). Every node owns an ordered list of children and may carry
//!     an [`Executable`].
//!
//!     Nodes are attached with [`CommandNode::attach`], which keeps siblings unique: a child
//!     structurally equal to an existing one (same kind and token, or same argument id, parser
//!     and optional flag) is merged into it instead of being appended. So
//!
//!         greet <name>
//!         greet <name> loudly
//!
//!     share one `greet` literal and one `name` argument, which ends up with two children: the
//!     leaf of the first command and the `loudly` literal of the second.
//!
//!     Trees are assembled through [`CommandTree`] and then frozen into [`Commands`], an
//!     immutable handle that can be cloned and parsed against from several threads. The only
//!     state touched while parsing is the per-node validity cache, which is behind a mutex.

use super::config::CommandsConfig;
use super::context::{ParseContext, SegmentNode};
use super::error::SetupError;
use super::executable::Executable;
use super::parsers::ValueParser;
use super::result::ParseResult;
use super::usage::ParserRegistry;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub enum NodeKind<C> {
    Root,
    Literal(String),
    Argument {
        id: String,
        parser: ValueParser<C>,
        optional: bool,
    },
}

impl<C> NodeKind<C> {
    pub fn is_root(&self) -> bool {
        matches!(self, NodeKind::Root)
    }

    pub(crate) fn segment(&self) -> SegmentNode {
        match self {
            NodeKind::Root => SegmentNode::Root,
            NodeKind::Literal(token) => SegmentNode::Literal {
                token: token.clone(),
            },
            NodeKind::Argument { id, optional, .. } => SegmentNode::Argument {
                id: id.clone(),
                optional: *optional,
            },
        }
    }
}

impl<C> PartialEq for NodeKind<C> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NodeKind::Root, NodeKind::Root) => true,
            (NodeKind::Literal(a), NodeKind::Literal(b)) => a == b,
            (
                NodeKind::Argument {
                    id,
                    parser,
                    optional,
                },
                NodeKind::Argument {
                    id: other_id,
                    parser: other_parser,
                    optional: other_optional,
                },
            ) => id == other_id && optional == other_optional && parser == other_parser,
            _ => false,
        }
    }
}

impl<C> fmt::Display for NodeKind<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Root => write!(f, "root"),
            NodeKind::Literal(token) => write!(f, "literal '{}'", token),
            NodeKind::Argument {
                id,
                parser,
                optional: false,
            } => write!(f, "argument <{}:{}>", id, parser.describe()),
            NodeKind::Argument {
                id,
                parser,
                optional: true,
            } => write!(f, "argument [{}:{}]", id, parser.describe()),
        }
    }
}

/// Identifies a context for validity caching.
///
/// Callers hand one in with [`Commands::parse_cached`]. Cached validity is reused only while
/// both fields match; bump `version` whenever something the validity predicates look at
/// changes (permissions, game mode, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub identity: u64,
    pub version: u64,
}

impl CacheKey {
    pub fn new(identity: u64, version: u64) -> Self {
        Self { identity, version }
    }
}

#[derive(Default)]
struct ValidityCache {
    last: Mutex<Option<(CacheKey, bool)>>,
}

pub struct CommandNode<C, T> {
    kind: NodeKind<C>,
    children: Vec<CommandNode<C, T>>,
    executable: Option<Arc<Executable<C, T>>>,
    validity: ValidityCache,
}

impl<C, T> CommandNode<C, T> {
    pub fn new(kind: NodeKind<C>) -> Self {
        Self {
            kind,
            children: Vec::new(),
            executable: None,
            validity: ValidityCache::default(),
        }
    }

    pub fn root() -> Self {
        Self::new(NodeKind::Root)
    }

    pub fn literal(token: impl Into<String>) -> Self {
        Self::new(NodeKind::Literal(token.into()))
    }

    pub fn argument(id: impl Into<String>, parser: impl Into<ValueParser<C>>, optional: bool) -> Self {
        Self::new(NodeKind::Argument {
            id: id.into(),
            parser: parser.into(),
            optional,
        })
    }

    /// A root-kind node carrying `executable`, used as the end of a command path
    pub fn leaf(executable: Executable<C, T>) -> Self {
        Self::root().with_executable(executable)
    }

    /// Chain `nodes` one below the other and end the chain with a leaf for `executable`.
    pub fn path(nodes: impl IntoIterator<Item = CommandNode<C, T>>, executable: Executable<C, T>) -> Self {
        let nodes: Vec<_> = nodes.into_iter().collect();
        nodes
            .into_iter()
            .rev()
            .fold(Self::leaf(executable), |child, mut parent| {
                parent.children.push(child);
                parent
            })
    }

    pub fn with_executable(mut self, executable: Executable<C, T>) -> Self {
        self.executable = Some(Arc::new(executable));
        self
    }

    pub fn with_child(mut self, child: CommandNode<C, T>) -> Result<Self, SetupError> {
        self.attach(child)?;
        Ok(self)
    }

    pub fn kind(&self) -> &NodeKind<C> {
        &self.kind
    }

    pub fn children(&self) -> &[CommandNode<C, T>] {
        &self.children
    }

    pub fn executable(&self) -> Option<&Arc<Executable<C, T>>> {
        self.executable.as_ref()
    }

    /// Equal ignoring children
    pub fn is_equal(&self, other: &Self) -> bool {
        self.kind == other.kind
    }

    /// Attach `child`, merging it into an equal existing child if there is one.
    ///
    /// Fails if the merge would give one path end two executables, whether both sit on the node
    /// itself or one of them on a leaf below it. The tree is left partially merged in that case
    /// and should be discarded.
    pub fn attach(&mut self, child: CommandNode<C, T>) -> Result<(), SetupError> {
        if child.kind.is_root() && child.ends_here() && self.ends_here() {
            return Err(self.ambiguous());
        }
        match self.children.iter_mut().find(|existing| existing.is_equal(&child)) {
            Some(existing) => existing.merge(child),
            None => {
                self.children.push(child);
                Ok(())
            }
        }
    }

    fn merge(&mut self, other: CommandNode<C, T>) -> Result<(), SetupError> {
        debug!(node = %self.kind, "merging equal command nodes");
        if let Some(executable) = other.executable {
            if self.ends_here() {
                return Err(self.ambiguous());
            }
            self.executable = Some(executable);
        }
        for grandchild in other.children {
            self.attach(grandchild)?;
        }
        Ok(())
    }

    /// True if a path can end at this node: it has an executable itself or through a leaf.
    fn ends_here(&self) -> bool {
        self.executable.is_some()
            || self
                .children
                .iter()
                .any(|child| child.kind.is_root() && child.ends_here())
    }

    fn ambiguous(&self) -> SetupError {
        SetupError::AmbiguousExecutable {
            node: self.kind.to_string(),
        }
    }

    /// Whether this node or anything below it is usable in `context`.
    pub fn is_valid(&self, context: &C, key: Option<CacheKey>) -> bool {
        self.resolve_valid(context, key, &mut HashMap::new())
    }

    /// [`CommandNode::is_valid`] with answers remembered in `known`, keyed by node address,
    /// so every node is asked at most once per parse call.
    pub(crate) fn resolve_valid(&self, context: &C, key: Option<CacheKey>, known: &mut HashMap<usize, bool>) -> bool {
        let address = self as *const Self as usize;
        if let Some(&valid) = known.get(&address) {
            return valid;
        }
        let valid = match key {
            Some(key) => self.cached_valid(context, key, known),
            None => self.check_valid(context, None, known),
        };
        known.insert(address, valid);
        valid
    }

    fn cached_valid(&self, context: &C, key: CacheKey, known: &mut HashMap<usize, bool>) -> bool {
        if let Some((cached_key, valid)) = *self.validity.last.lock() {
            if cached_key == key {
                return valid;
            }
        }
        // computed without holding the lock, children lock their own caches
        let valid = self.check_valid(context, Some(key), known);
        *self.validity.last.lock() = Some((key, valid));
        valid
    }

    fn check_valid(&self, context: &C, key: Option<CacheKey>, known: &mut HashMap<usize, bool>) -> bool {
        self.executable
            .as_ref()
            .is_some_and(|executable| executable.is_valid(context))
            || self
                .children
                .iter()
                .any(|child| child.resolve_valid(context, key, known))
    }

    /// True if this node can be skipped entirely: root-kind, or an optional argument, with
    /// only such nodes below.
    pub(crate) fn is_tree_optional(&self) -> bool {
        let skippable = match &self.kind {
            NodeKind::Root => true,
            NodeKind::Literal(_) => false,
            NodeKind::Argument { optional, .. } => *optional,
        };
        skippable && self.children.iter().all(CommandNode::is_tree_optional)
    }
}

impl<C, T> fmt::Debug for CommandNode<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("kind", &self.kind.to_string())
            .field("executable", &self.executable)
            .field("children", &self.children)
            .finish()
    }
}

/// Mutable tree under construction
pub struct CommandTree<C, T> {
    root: CommandNode<C, T>,
    parsers: ParserRegistry<C>,
    config: CommandsConfig,
}

impl<C, T> CommandTree<C, T> {
    pub fn new() -> Self {
        Self {
            root: CommandNode::root(),
            parsers: ParserRegistry::default(),
            config: CommandsConfig::default(),
        }
    }

    pub fn with_parsers(mut self, parsers: ParserRegistry<C>) -> Self {
        self.parsers = parsers;
        self
    }

    pub fn with_config(mut self, config: CommandsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn parsers_mut(&mut self) -> &mut ParserRegistry<C> {
        &mut self.parsers
    }

    /// Attach a node (usually a path) below the root.
    pub fn add(&mut self, node: CommandNode<C, T>) -> Result<&mut Self, SetupError> {
        self.root.attach(node)?;
        Ok(self)
    }

    /// Parse `usage` against the registered parsers and attach the resulting path.
    pub fn register(&mut self, usage: &str, executable: Executable<C, T>) -> Result<&mut Self, SetupError> {
        self.parsers
            .path(usage, executable)
            .and_then(|node| self.root.attach(node))
            .map_err(|err| err.in_usage(usage))?;
        Ok(self)
    }

    pub fn root(&self) -> &CommandNode<C, T> {
        &self.root
    }

    /// Finish assembly. Nothing can be attached afterwards.
    pub fn freeze(self) -> Commands<C, T> {
        debug!(children = self.root.children.len(), "command tree frozen");
        Commands {
            root: Arc::new(self.root),
            config: Arc::new(self.config),
        }
    }
}

impl<C, T> Default for CommandTree<C, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Frozen, shareable command tree
pub struct Commands<C, T> {
    root: Arc<CommandNode<C, T>>,
    config: Arc<CommandsConfig>,
}

impl<C, T> Clone for Commands<C, T> {
    fn clone(&self) -> Self {
        Self {
            root: Arc::clone(&self.root),
            config: Arc::clone(&self.config),
        }
    }
}

impl<C: Clone, T> Commands<C, T> {
    /// Match `input` against every path of the tree.
    pub fn parse(&self, context: C, input: &str) -> Result<ParseResult<C, T>, SetupError> {
        self.run(context, None, input)
    }

    /// Like [`Commands::parse`], reusing cached validity for `key`.
    pub fn parse_cached(&self, context: C, key: CacheKey, input: &str) -> Result<ParseResult<C, T>, SetupError> {
        let key = self.config.parsing.validity_cache.then_some(key);
        self.run(context, key, input)
    }

    fn run(&self, context: C, key: Option<CacheKey>, input: &str) -> Result<ParseResult<C, T>, SetupError> {
        let mut cx = ParseContext::new(context, input, key, Arc::clone(&self.config));
        cx.enter(&self.root, |cx| self.root.visit(cx))?;
        let result = cx.finish();
        debug!(
            input,
            matches = result.matches().len(),
            failures = result.failures().len(),
            "parsed command input"
        );
        Ok(result)
    }
}

impl<C, T> Commands<C, T> {
    pub fn root(&self) -> &CommandNode<C, T> {
        &self.root
    }

    pub fn config(&self) -> &CommandsConfig {
        &self.config
    }
}
