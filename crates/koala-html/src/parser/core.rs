use std::fmt::Write as _;

use koala_common::string::strip_and_collapse_ascii_whitespace;
use koala_common::warning::warn_once;
use koala_dom::{CharacterDataKind, DomError, DomTree, NodeData, NodeId};

use super::modes::{CommentTarget, InsertionMode, TreeAction, TreeContext, transition};
use crate::error::{ParseErrorKind, ParseIssue};
use crate::tokenizer::{HTMLTokenizer, Token};

/// Parser configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// Collect parse errors without logging them to stderr.
    pub quiet: bool,
    /// Report the first parse error as a failure once parsing is done.
    /// See [`ParsedDocument::into_strict_result`](crate::ParsedDocument::into_strict_result).
    pub strict: bool,
}

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// The HTML parser builds a DOM tree from the tokens of its own
/// [`HTMLTokenizer`], pulling one token at a time.
#[derive(Debug)]
pub struct HTMLParser<'a> {
    /// DOM tree the document lives in.
    tree: &'a mut DomTree,

    /// The Document being parsed into.
    document: NodeId,

    tokenizer: HTMLTokenizer,

    /// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    insertion_mode: InsertionMode,

    /// [§ 13.2.4.1 The original insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    original_insertion_mode: Option<InsertionMode>,

    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    ///
    /// Stores `NodeId`s into the arena.
    stack_of_open_elements: Vec<NodeId>,

    /// Tag names of `stack_of_open_elements`, kept in step with it.
    open_element_names: Vec<String>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    head_element_pointer: Option<NodeId>,

    /// Whether the document title has been taken from a `title` element.
    title_set: bool,

    /// Whether we've stopped parsing.
    stopped: bool,

    /// Parse errors from both stages, in the order they were raised.
    issues: Vec<ParseIssue>,

    options: ParserOptions,
}

impl<'a> HTMLParser<'a> {
    /// Create a parser that appends the parse of `input` to `document`.
    #[must_use]
    pub fn new(tree: &'a mut DomTree, document: NodeId, input: &str) -> Self {
        Self {
            tree,
            document,
            tokenizer: HTMLTokenizer::new(input),
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: None,
            stack_of_open_elements: Vec::new(),
            open_element_names: Vec::new(),
            head_element_pointer: None,
            title_set: false,
            stopped: false,
            issues: Vec::new(),
            options: ParserOptions::default(),
        }
    }

    /// Replace the parser options.
    #[must_use]
    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.tokenizer.set_quiet(options.quiet);
        self.options = options;
        self
    }

    /// The options this parser runs with.
    #[must_use]
    pub const fn options(&self) -> ParserOptions {
        self.options
    }

    /// The current insertion mode.
    #[must_use]
    pub const fn insertion_mode(&self) -> InsertionMode {
        self.insertion_mode
    }

    /// Run the parser to the end of the input and return the parse errors.
    ///
    /// # Errors
    ///
    /// A [`DomError`] only if the tree rejects a mutation the insertion
    /// modes asked for, which points at a bug rather than at bad input.
    pub fn run(mut self) -> Result<Vec<ParseIssue>, DomError> {
        while !self.stopped {
            let Some(token) = self.tokenizer.next_token() else {
                break;
            };
            // Tokenizer errors come before the token they were raised for.
            self.issues.extend(self.tokenizer.take_issues());
            self.process_token(&token)?;
        }
        self.issues.extend(self.tokenizer.take_issues());
        self.stop_parsing()?;
        Ok(self.issues)
    }

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    ///
    /// Hand `token` to the current insertion mode until a mode consumes it.
    fn process_token(&mut self, token: &Token) -> Result<(), DomError> {
        loop {
            let next = {
                let context = TreeContext {
                    open_elements: &self.open_element_names,
                    original_mode: self.original_insertion_mode,
                };
                transition(self.insertion_mode, token, &context)
            };
            for action in next.actions {
                self.apply(action)?;
            }
            self.insertion_mode = next.mode;
            if !next.reprocess || self.stopped {
                return Ok(());
            }
        }
    }

    fn apply(&mut self, action: TreeAction) -> Result<(), DomError> {
        match action {
            TreeAction::ParseError(kind) => self.parse_error(kind),
            TreeAction::InsertDoctype {
                name,
                public_id,
                system_id,
            } => {
                let doctype =
                    self.tree
                        .create_document_type(self.document, &name, &public_id, &system_id)?;
                let _ = self.tree.append_child(self.document, doctype)?;
            }
            TreeAction::SetQuirksMode(mode) => self.tree.set_quirks_mode(self.document, mode)?,
            TreeAction::InsertComment { data, target } => self.insert_comment(&data, target)?,
            TreeAction::InsertElement { tag_name, push } => {
                let element = self.insert_html_element(&tag_name)?;
                if push {
                    self.push_open_element(element, tag_name);
                }
            }
            TreeAction::InsertHead => {
                let head = self.insert_html_element("head")?;
                self.push_open_element(head, "head".to_owned());
                self.head_element_pointer = Some(head);
            }
            TreeAction::InsertCharacter(c) => self.insert_character(c)?,
            TreeAction::PopCurrentNode => self.pop_current_node()?,
            TreeAction::PopUntil(tag_name) => self.pop_until_tag(&tag_name)?,
            TreeAction::PushHead => {
                if let Some(head) = self.head_element_pointer {
                    self.push_open_element(head, "head".to_owned());
                }
            }
            TreeAction::RemoveHead => {
                if let Some(head) = self.head_element_pointer
                    && let Some(index) = self.stack_of_open_elements.iter().rposition(|&id| id == head)
                {
                    let _ = self.stack_of_open_elements.remove(index);
                    let _ = self.open_element_names.remove(index);
                }
            }
            TreeAction::SetOriginalMode(mode) => self.original_insertion_mode = Some(mode),
            TreeAction::StopParsing => self.stopped = true,
        }
        Ok(())
    }

    // ===== Stack of open elements =====

    fn push_open_element(&mut self, element: NodeId, tag_name: String) {
        self.stack_of_open_elements.push(element);
        self.open_element_names.push(tag_name);
    }

    /// "The current node is the bottommost node in this stack of open
    /// elements."
    fn current_node(&self) -> Option<NodeId> {
        self.stack_of_open_elements.last().copied()
    }

    /// Pop the current node off the stack of open elements.
    fn pop_current_node(&mut self) -> Result<(), DomError> {
        let _ = self.open_element_names.pop();
        if let Some(element) = self.stack_of_open_elements.pop() {
            self.element_popped(element)?;
        }
        Ok(())
    }

    /// Pop elements until an element with `tag_name` has been popped.
    fn pop_until_tag(&mut self, tag_name: &str) -> Result<(), DomError> {
        if !self.open_element_names.iter().any(|name| name == tag_name) {
            return Ok(());
        }
        while let Some(name) = self.open_element_names.last() {
            let done = name == tag_name;
            self.pop_current_node()?;
            if done {
                break;
            }
        }
        Ok(())
    }

    /// [§ 4.2.2 The title element](https://html.spec.whatwg.org/multipage/semantics.html#the-title-element)
    ///
    /// The document title is "the child text content of the title element,
    /// with ASCII whitespace stripped and collapsed", taken from the first
    /// `title` element once it closes.
    fn element_popped(&mut self, element: NodeId) -> Result<(), DomError> {
        if self.title_set
            || self
                .tree
                .as_element(element)
                .is_none_or(|data| data.tag_name != "title")
        {
            return Ok(());
        }
        let text = self.tree.text_content(element).unwrap_or_default();
        self.tree
            .set_title(self.document, &strip_and_collapse_ascii_whitespace(&text))?;
        self.title_set = true;
        Ok(())
    }

    /// [§ 13.2.7 The end](https://html.spec.whatwg.org/multipage/parsing.html#stop-parsing)
    ///
    /// "Pop all the nodes off the stack of open elements."
    fn stop_parsing(&mut self) -> Result<(), DomError> {
        self.stopped = true;
        while !self.stack_of_open_elements.is_empty() {
            self.pop_current_node()?;
        }
        Ok(())
    }

    // ===== Creating and inserting nodes =====

    /// [§ 13.2.6.1 Appropriate place for inserting a node](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// The current node, or the Document while the stack is empty.
    fn insertion_parent(&self) -> NodeId {
        self.current_node().unwrap_or(self.document)
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// Creates the element and appends it at the appropriate place. Pushing
    /// it onto the stack of open elements is up to the caller.
    fn insert_html_element(&mut self, tag_name: &str) -> Result<NodeId, DomError> {
        let element = self.tree.create_element(self.document, tag_name)?;
        let parent = self.insertion_parent();
        self.tree.append_child(parent, element)
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    fn insert_character(&mut self, c: char) -> Result<(), DomError> {
        // STEP 1: "Let the adjusted insertion location be the appropriate place for inserting
        // a node."
        let parent = self.insertion_parent();

        // STEP 2: "If the adjusted insertion location is in a Document node, then return."
        if parent == self.document {
            return Ok(());
        }

        // STEP 3: "If there is a Text node immediately before the adjusted insertion location,
        // then append data to that Text node's data."
        let mut buffer = [0; 4];
        let data = c.encode_utf8(&mut buffer);
        if let Some(last) = self.tree.last_child(parent)
            && self.tree.as_text(last).is_some()
        {
            return self.tree.append_data(last, data);
        }

        // "Otherwise, create a new Text node whose data is data and whose node document is the
        // same as that of the element in which the adjusted insertion location finds itself,
        // and insert the newly created node at the adjusted insertion location."
        let text = self.tree.create_text(self.document, data)?;
        let _ = self.tree.append_child(parent, text)?;
        Ok(())
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    fn insert_comment(&mut self, data: &str, target: CommentTarget) -> Result<(), DomError> {
        let parent = match target {
            CommentTarget::Document => self.document,
            CommentTarget::CurrentNode => self.insertion_parent(),
            CommentTarget::HtmlElement => self
                .stack_of_open_elements
                .first()
                .copied()
                .unwrap_or(self.document),
        };
        let comment = self.tree.create_comment(self.document, data)?;
        let _ = self.tree.append_child(parent, comment)?;
        Ok(())
    }

    // ===== Errors =====

    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Record a tree-construction error at the tokenizer's position.
    fn parse_error(&mut self, kind: ParseErrorKind) {
        let position = self.tokenizer.position();
        if !self.options.quiet {
            let _ = warn_once(
                "HTML Parser",
                &format!("{kind} in {} at position {position}", self.insertion_mode),
            );
        }
        self.issues
            .push(ParseIssue::tree_construction(kind, position));
    }
}

/// Render the subtree at `id` as an indented outline, one node per line.
///
/// Text is quoted with newlines shown as `\n` and spaces as `·`.
#[must_use]
pub fn dump_tree(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    dump_node(tree, id, 0, &mut out);
    out
}

fn dump_node(tree: &DomTree, id: NodeId, indent: usize, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let prefix = "  ".repeat(indent);
    let _ = match node.data() {
        NodeData::Document(_) => writeln!(out, "{prefix}#document"),
        NodeData::DocumentType(doctype) => writeln!(out, "{prefix}<!DOCTYPE {}>", doctype.name),
        NodeData::DocumentFragment(_) => writeln!(out, "{prefix}#document-fragment"),
        NodeData::Element(data) => writeln!(out, "{prefix}<{}>", data.tag_name),
        NodeData::CharacterData(data) => match data.kind {
            CharacterDataKind::Text => {
                let display = data.data.replace('\n', "\\n").replace(' ', "\u{00B7}");
                writeln!(out, "{prefix}\"{display}\"")
            }
            CharacterDataKind::Comment => writeln!(out, "{prefix}<!-- {} -->", data.data),
            CharacterDataKind::ProcessingInstruction => {
                writeln!(out, "{prefix}<?{} {}>", node.name(), data.data)
            }
        },
    };
    for &child in tree.children(id) {
        dump_node(tree, child, indent + 1, out);
    }
}

/// Print a DOM tree for debugging.
pub fn print_tree(tree: &DomTree, id: NodeId) {
    print!("{}", dump_tree(tree, id));
}
