//! The tree builder and backtracking engine.
//!
//! Grammar rules drive a [`Parser`] value threaded by `&mut`: they open
//! markers, consume significant tokens, and close markers into nodes. All
//! state lives in this one value, so backtracking is a plain truncation of
//! the event list and the cursor.
//!
//! Rules express the pinning discipline structurally: before a rule has
//! consumed its commit token, failures roll the marker back and report
//! nothing; after it, failures record a positioned diagnostic via
//! [`Parser::error`] or [`Parser::expect`] and the rule still closes a
//! (possibly partial) node, so the parent continues normally. Diagnostics
//! recorded inside an attempt that is later rolled back are discarded with
//! it.

use crate::config::ParseConfig;
use crate::cst::{Child, NodeData, NodeId, NodeKind, SyntaxTree};
use crate::error::Diagnostic;
use crate::token::{Location, Token, TokenKind};

#[derive(Debug)]
enum Event {
    /// A node boundary; `kind: None` is a tombstone (abandoned marker) whose
    /// children re-attach to the parent.
    Open { kind: Option<NodeKind> },
    Close,
    /// Consume the next significant token (preceding trivia rides along).
    Token,
}

/// Handle to an open node boundary. Markers nest strictly: a marker may only
/// be resolved after every marker opened later has been resolved.
pub(crate) struct Marker {
    event: usize,
    pos: usize,
    errors: usize,
}

pub(crate) struct Parser {
    tokens: Vec<Token>,
    /// Indices of non-trivia, non-EOF tokens; the cursor walks this list.
    significant: Vec<u32>,
    pos: usize,
    events: Vec<Event>,
    errors: Vec<Diagnostic>,
    config: ParseConfig,
    /// (open event, start, end, kind) of the most recently closed node.
    last_done: Option<(usize, usize, usize, NodeKind)>,
    /// Kept outside `errors` so rollbacks of the failing alternatives cannot
    /// discard it; appended once when the parse finishes.
    depth_error: Option<Diagnostic>,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>, config: ParseConfig) -> Self {
        let significant = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| !token.kind.is_trivia() && token.kind != TokenKind::Eof)
            .map(|(index, _)| index as u32)
            .collect();
        Self {
            tokens,
            significant,
            pos: 0,
            events: Vec::new(),
            errors: Vec::new(),
            config,
            last_done: None,
            depth_error: None,
        }
    }

    // --- cursor ---------------------------------------------------------

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.significant.len()
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    fn token_at(&self, pos: usize) -> Option<&Token> {
        self.significant
            .get(pos)
            .map(|&raw| &self.tokens[raw as usize])
    }

    /// Kind of the token `n` steps ahead; `Eof` past the end.
    pub(crate) fn nth(&self, n: usize) -> TokenKind {
        self.token_at(self.pos + n)
            .map(|token| token.kind)
            .unwrap_or(TokenKind::Eof)
    }

    pub(crate) fn current(&self) -> TokenKind {
        self.nth(0)
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    pub(crate) fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.current())
    }

    /// Consume the current token unconditionally.
    pub(crate) fn bump(&mut self) {
        debug_assert!(!self.at_end(), "bump past end of input");
        if !self.at_end() {
            self.events.push(Event::Token);
            self.pos += 1;
        }
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume `kind` or record an "expected" diagnostic. For use after a
    /// rule has committed (pinned).
    pub(crate) fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!("expected {:?}", kind));
            false
        }
    }

    // --- markers --------------------------------------------------------

    pub(crate) fn open(&mut self) -> Marker {
        let marker = Marker {
            event: self.events.len(),
            pos: self.pos,
            errors: self.errors.len(),
        };
        self.events.push(Event::Open { kind: None });
        marker
    }

    /// Complete the marker as a node of `kind`.
    pub(crate) fn close(&mut self, marker: Marker, kind: NodeKind) {
        self.last_done = Some((marker.event, marker.pos, self.pos, kind));
        self.events[marker.event] = Event::Open { kind: Some(kind) };
        self.events.push(Event::Close);
    }

    /// Complete the marker as `kind` unless its span is exactly one
    /// already-completed node of the same kind, in which case the wrapper is
    /// dropped. This is what flattens same-precedence operator chains into
    /// one node per level.
    pub(crate) fn close_collapse(&mut self, marker: Marker, kind: NodeKind) {
        if let Some((event, start, end, done_kind)) = self.last_done {
            if event > marker.event && start == marker.pos && end == self.pos && done_kind == kind
            {
                self.abandon(marker);
                return;
            }
        }
        self.close(marker, kind);
    }

    /// Drop the marker; children consumed under it re-attach to the parent.
    pub(crate) fn abandon(&mut self, marker: Marker) {
        debug_assert!(matches!(
            self.events[marker.event],
            Event::Open { kind: None }
        ));
        let _ = marker;
    }

    /// Undo everything since the marker was opened: cursor, events, and any
    /// diagnostics recorded during the failed attempt. Returns `false` so
    /// rules can `return p.rollback(m);`.
    pub(crate) fn rollback(&mut self, marker: Marker) -> bool {
        self.pos = marker.pos;
        self.events.truncate(marker.event);
        self.errors.truncate(marker.errors);
        if let Some((event, _, _, _)) = self.last_done {
            if event >= marker.event {
                self.last_done = None;
            }
        }
        false
    }

    // --- diagnostics ----------------------------------------------------

    fn error_location(&self) -> Location {
        // Anchor at the offending token, or just past the previous one when
        // the failure is "line ended too early".
        let at_line_end = self.at_end() || self.at(TokenKind::Crlf);
        if at_line_end && self.pos > 0 {
            if let Some(previous) = self.token_at(self.pos - 1) {
                return previous.end_location();
            }
        }
        self.token_at(self.pos)
            .map(|token| token.location)
            .unwrap_or_else(|| {
                self.tokens
                    .last()
                    .map(|token| token.end_location())
                    .unwrap_or_else(Location::start)
            })
    }

    /// Record a diagnostic at the current position. At most one diagnostic
    /// is kept per position (first wins) and the total is capped by
    /// `max_errors`.
    pub(crate) fn error(&mut self, message: impl Into<String>) {
        let location = self.error_location();
        if self
            .errors
            .last()
            .is_some_and(|last| last.location == location)
        {
            return;
        }
        if self.errors.len() >= self.config.max_errors {
            return;
        }
        self.errors.push(Diagnostic::new(message, location));
    }

    /// Depth check threaded through every rule as an explicit `level`.
    /// Failing the check fails the alternative cleanly; one diagnostic is
    /// recorded for the whole parse.
    pub(crate) fn guard(&mut self, level: u32) -> bool {
        if level < self.config.max_depth {
            return true;
        }
        if self.depth_error.is_none() {
            self.depth_error = Some(Diagnostic::new("nesting too deep", self.error_location()));
        }
        false
    }

    // --- tree construction ----------------------------------------------

    pub(crate) fn finish(mut self) -> (SyntaxTree, Vec<Diagnostic>) {
        if let Some(diagnostic) = self.depth_error.take() {
            if self.errors.len() < self.config.max_errors {
                self.errors.push(diagnostic);
            }
        }
        let mut arena: Vec<NodeData> = Vec::new();
        let mut stack: Vec<NodeData> = vec![NodeData {
            kind: NodeKind::Program,
            children: Vec::new(),
        }];
        let mut raw = 0usize;
        let mut significant_iter = self.significant.iter();

        for event in &self.events {
            match event {
                Event::Open { kind: Some(kind) } => {
                    stack.push(NodeData {
                        kind: *kind,
                        children: Vec::new(),
                    });
                }
                Event::Open { kind: None } => {}
                Event::Close => {
                    let node = stack.pop().expect("unbalanced close event");
                    let id = NodeId(arena.len() as u32);
                    arena.push(node);
                    stack
                        .last_mut()
                        .expect("close event at root")
                        .children
                        .push(Child::Node(id));
                }
                Event::Token => {
                    let next = *significant_iter.next().expect("token event past stream")
                        as usize;
                    let top = stack.last_mut().expect("token event at root");
                    while raw < next {
                        top.children.push(Child::Token(raw as u32));
                        raw += 1;
                    }
                    top.children.push(Child::Token(next as u32));
                    raw = next + 1;
                }
            }
        }

        debug_assert_eq!(stack.len(), 1, "unclosed markers at end of parse");
        let mut root = stack.pop().expect("missing root frame");
        // Trailing trivia (and the EOF sentinel, if present) belong to the
        // root so the leaf sequence stays gap-free.
        while raw < self.tokens.len() {
            root.children.push(Child::Token(raw as u32));
            raw += 1;
        }
        let root_id = NodeId(arena.len() as u32);
        arena.push(root);

        let tree = SyntaxTree {
            nodes: arena,
            tokens: self.tokens,
            root: root_id,
        };
        (tree, self.errors)
    }
}
