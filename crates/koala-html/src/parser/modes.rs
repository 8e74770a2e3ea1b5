//! Insertion modes and their rules.
//!
//! [§ 13.2.6.4 The rules for parsing tokens in HTML content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhtml)
//!
//! Every mode is a pure function from the current token and a read-only
//! [`TreeContext`] to a [`Transition`]. The parser applies the transition's
//! [`TreeAction`]s in order, switches to its mode and, when `reprocess` is
//! set, hands the same token to the new mode.

use koala_dom::QuirksMode;
use strum_macros::Display;

use crate::error::ParseErrorKind;
use crate::tokenizer::Token;

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
///
/// Table, select, template and frameset modes are not implemented; their
/// start tags are inserted as ordinary elements in body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    #[default]
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    ///
    /// Entered after `<title>`, `<style>`, `<script>` and the other elements
    /// whose contents are text. Everything up to the next end tag becomes a
    /// child of that element.
    Text,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
}

/// Where "insert a comment" puts the new node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentTarget {
    /// "Insert a comment as the last child of the Document object."
    Document,
    /// "Insert a comment" at the appropriate place for inserting a node.
    CurrentNode,
    /// "Insert a comment as the last child of the first element in the stack
    /// of open elements (the html element)."
    HtmlElement,
}

/// One tree mutation or parser-state change requested by a mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeAction {
    /// Record a parse error. Never stops the parse.
    ParseError(ParseErrorKind),
    /// Append a `DocumentType` node to the Document. Missing token fields
    /// arrive here as empty strings.
    InsertDoctype {
        /// Doctype name.
        name: String,
        /// Public identifier.
        public_id: String,
        /// System identifier.
        system_id: String,
    },
    /// Set the Document's mode.
    SetQuirksMode(QuirksMode),
    /// Create a Comment node.
    InsertComment {
        /// Comment text.
        data: String,
        /// Where the comment goes.
        target: CommentTarget,
    },
    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    InsertElement {
        /// Tag name of the new element.
        tag_name: String,
        /// Whether the element is put on the stack of open elements. Void
        /// elements and self-closing tags are not.
        push: bool,
    },
    /// Insert a `head` element, push it and set the head element pointer.
    InsertHead,
    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    InsertCharacter(char),
    /// Pop the current node off the stack of open elements.
    PopCurrentNode,
    /// Pop elements until one with this tag name has been popped.
    PopUntil(String),
    /// "Push the node pointed to by the head element pointer onto the stack of
    /// open elements."
    PushHead,
    /// "Remove the node pointed to by the head element pointer from the stack
    /// of open elements. (It might not be the current node at this point.)"
    RemoveHead,
    /// "Let the original insertion mode be the current insertion mode."
    SetOriginalMode(InsertionMode),
    /// [§ 13.2.7 The end](https://html.spec.whatwg.org/multipage/parsing.html#stop-parsing)
    StopParsing,
}

/// The outcome of processing one token in one mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The insertion mode after this token.
    pub mode: InsertionMode,
    /// Mutations to apply, in order.
    pub actions: Vec<TreeAction>,
    /// "Reprocess the token" in `mode`.
    pub reprocess: bool,
}

impl Transition {
    /// Switch to `mode` without doing anything else.
    #[must_use]
    pub const fn to(mode: InsertionMode) -> Self {
        Self {
            mode,
            actions: Vec::new(),
            reprocess: false,
        }
    }

    /// Append an action.
    #[must_use]
    pub fn with(mut self, action: TreeAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Ask for the token to be processed again in the new mode.
    #[must_use]
    pub const fn reprocess(mut self) -> Self {
        self.reprocess = true;
        self
    }
}

/// What a mode may know about the parser while deciding a transition.
#[derive(Debug, Clone, Copy)]
pub struct TreeContext<'a> {
    /// Tag names on the stack of open elements, bottom first.
    pub open_elements: &'a [String],
    /// [§ 13.2.4.1 The original insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    pub original_mode: Option<InsertionMode>,
}

impl TreeContext<'_> {
    /// "The current node is the bottommost node in this stack of open
    /// elements."
    #[must_use]
    pub fn current_node(&self) -> Option<&str> {
        self.open_elements.last().map(String::as_str)
    }

    /// Whether an element with this tag name is open.
    ///
    /// Stands in for "has an element in scope" and "in button scope". The
    /// modes built here never put a scope boundary (`table`, `td`, `button`,
    /// `template`, ...) between the element and the stack's bottom, so the
    /// whole stack is searched.
    #[must_use]
    pub fn has_open_element(&self, tag_name: &str) -> bool {
        self.open_elements.iter().any(|name| name == tag_name)
    }
}

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "Void elements only have a start tag; end tags must not be specified for
/// void elements." The legacy `basefont`, `bgsound`, `keygen` and `param`
/// are parsed the same way.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "hr", "img", "input", "keygen",
    "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose contents are read in the "text" insertion mode.
const TEXT_CONTENT_ELEMENTS: &[&str] = &[
    "title", "textarea", "style", "xmp", "iframe", "noembed", "noframes", "noscript", "script",
];

/// Start tags the "in head" mode handles itself.
const HEAD_CONTENT_ELEMENTS: &[&str] = &[
    "base", "basefont", "bgsound", "link", "meta", "title", "noframes", "style", "noscript",
    "script",
];

/// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
///
/// Start tags that "close a p element" if one is in button scope.
const CLOSES_P_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "details", "dialog", "dir", "div",
    "dl", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hgroup", "hr", "listing", "main", "menu", "nav", "ol", "p", "pre", "search",
    "section", "summary", "table", "ul",
];

/// Elements that may stay open at the end of the body without a parse error.
const MAY_REMAIN_OPEN_AT_EOF: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc", "tbody", "td", "tfoot",
    "th", "thead", "tr", "body", "html",
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
///
/// Process `token` according to the rules for `mode`.
#[must_use]
pub fn transition(mode: InsertionMode, token: &Token, context: &TreeContext<'_>) -> Transition {
    match mode {
        InsertionMode::Initial => initial(token),
        InsertionMode::BeforeHtml => before_html(token),
        InsertionMode::BeforeHead => before_head(token),
        InsertionMode::InHead => in_head(token),
        InsertionMode::AfterHead => after_head(token),
        InsertionMode::InBody => in_body(token, context),
        InsertionMode::Text => text(token, context),
        InsertionMode::AfterBody => after_body(token),
        InsertionMode::AfterAfterBody => after_after_body(token),
    }
}

/// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
fn initial(token: &Token) -> Transition {
    match token {
        // "A character token that is one of U+0009 CHARACTER TABULATION, U+000A LINE FEED (LF),
        // U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE"
        // "Ignore the token."
        Token::Character { .. } if token.is_whitespace_character() => {
            Transition::to(InsertionMode::Initial)
        }

        // "A comment token"
        // "Insert a comment as the last child of the Document object."
        Token::Comment { data } => {
            Transition::to(InsertionMode::Initial).with(comment(data, CommentTarget::Document))
        }

        // "A DOCTYPE token"
        // "If the DOCTYPE token's name is not "html", or the token's public identifier is not
        // missing, or the token's system identifier is neither missing nor "about:legacy-compat",
        // then there is a parse error."
        //
        // "Append a DocumentType node to the Document node, with its name set to the name given
        // in the DOCTYPE token, or the empty string if the name was missing; its public ID set to
        // the public identifier given in the DOCTYPE token, or the empty string if the public
        // identifier was missing; and its system ID set to the system identifier given in the
        // DOCTYPE token, or the empty string if the system identifier was missing."
        //
        // "Then, if the document is not an iframe srcdoc document, and the parser cannot change
        // the mode flag is false, and the DOCTYPE token matches one of the conditions in the
        // following list, then set the Document to quirks mode: The force-quirks flag is set
        // to on. ..."
        //
        // "Then, switch the insertion mode to "before html"."
        Token::Doctype {
            name,
            public_identifier,
            system_identifier,
            force_quirks,
        } => {
            let mut transition = Transition::to(InsertionMode::BeforeHtml);
            let conforming = name.as_deref() == Some("html")
                && public_identifier.is_none()
                && system_identifier
                    .as_deref()
                    .is_none_or(|system| system == "about:legacy-compat");
            if !conforming {
                transition = transition.with(TreeAction::ParseError(
                    ParseErrorKind::NonConformingDoctype,
                ));
            }
            transition = transition.with(TreeAction::InsertDoctype {
                name: name.clone().unwrap_or_default(),
                public_id: public_identifier.clone().unwrap_or_default(),
                system_id: system_identifier.clone().unwrap_or_default(),
            });
            if *force_quirks {
                transition = transition.with(TreeAction::SetQuirksMode(QuirksMode::Quirks));
            }
            transition
        }

        // "Anything else"
        // "If the document is not an iframe srcdoc document, then this is a parse error; if the
        // parser cannot change the mode flag is false, set the Document to quirks mode."
        // "In any case, switch the insertion mode to "before html", then reprocess the token."
        _ => Transition::to(InsertionMode::BeforeHtml)
            .with(TreeAction::ParseError(ParseErrorKind::MissingDoctype))
            .with(TreeAction::SetQuirksMode(QuirksMode::Quirks))
            .reprocess(),
    }
}

/// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
fn before_html(token: &Token) -> Transition {
    let stay = Transition::to(InsertionMode::BeforeHtml);
    match token {
        // "A DOCTYPE token"
        // "Parse error. Ignore the token."
        Token::Doctype { .. } => stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedDoctype)),

        // "A comment token"
        // "Insert a comment as the last child of the Document object."
        Token::Comment { data } => stay.with(comment(data, CommentTarget::Document)),

        // Whitespace: "Ignore the token."
        Token::Character { .. } if token.is_whitespace_character() => stay,

        // "A start tag whose tag name is "html""
        // "Create an element for the token in the HTML namespace, with the Document as the
        // intended parent. Append it to the Document object. Put this element in the stack of
        // open elements."
        // "Switch the insertion mode to "before head"."
        Token::StartTag { name, .. } if name == "html" => {
            Transition::to(InsertionMode::BeforeHead).with(open_element("html"))
        }

        // "Any other end tag"
        // "Parse error. Ignore the token."
        Token::EndTag { name, .. } if !matches!(name.as_str(), "head" | "body" | "html" | "br") => {
            stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedEndTag))
        }

        // "Anything else"
        // "Create an html element whose node document is the Document object. Append it to the
        // Document object. Put this element in the stack of open elements."
        // "Switch the insertion mode to "before head", then reprocess the token."
        _ => Transition::to(InsertionMode::BeforeHead)
            .with(open_element("html"))
            .reprocess(),
    }
}

/// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
fn before_head(token: &Token) -> Transition {
    let stay = Transition::to(InsertionMode::BeforeHead);
    match token {
        // Whitespace: "Ignore the token."
        Token::Character { .. } if token.is_whitespace_character() => stay,

        // "A comment token"
        // "Insert a comment."
        Token::Comment { data } => stay.with(comment(data, CommentTarget::CurrentNode)),

        // "A DOCTYPE token"
        // "Parse error. Ignore the token."
        Token::Doctype { .. } => stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedDoctype)),

        // "A start tag whose tag name is "html""
        // "Process the token using the rules for the "in body" insertion mode."
        // In body ignores it with a parse error.
        Token::StartTag { name, .. } if name == "html" => {
            stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedStartTag))
        }

        // "A start tag whose tag name is "head""
        // "Insert an HTML element for the token."
        // "Set the head element pointer to the newly created head element."
        // "Switch the insertion mode to "in head"."
        Token::StartTag { name, .. } if name == "head" => {
            Transition::to(InsertionMode::InHead).with(TreeAction::InsertHead)
        }

        // "Any other end tag"
        // "Parse error. Ignore the token."
        Token::EndTag { name, .. } if !matches!(name.as_str(), "head" | "body" | "html" | "br") => {
            stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedEndTag))
        }

        // "Anything else"
        // "Insert an HTML element for a "head" start tag token with no attributes."
        // "Set the head element pointer to the newly created head element."
        // "Switch the insertion mode to "in head"."
        // "Reprocess the current token."
        _ => Transition::to(InsertionMode::InHead)
            .with(TreeAction::InsertHead)
            .reprocess(),
    }
}

/// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
fn in_head(token: &Token) -> Transition {
    let stay = Transition::to(InsertionMode::InHead);
    match token {
        // Whitespace: "Insert the character."
        Token::Character { data } if token.is_whitespace_character() => {
            stay.with(TreeAction::InsertCharacter(*data))
        }

        // "A comment token"
        // "Insert a comment."
        Token::Comment { data } => stay.with(comment(data, CommentTarget::CurrentNode)),

        // "A DOCTYPE token"
        // "Parse error. Ignore the token."
        Token::Doctype { .. } => stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedDoctype)),

        // "A start tag whose tag name is "html""
        // "Process the token using the rules for the "in body" insertion mode."
        //
        // "A start tag whose tag name is "head""
        // "Parse error. Ignore the token."
        Token::StartTag { name, .. } if name == "html" || name == "head" => {
            stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedStartTag))
        }

        Token::StartTag {
            name,
            self_closing,
        } if HEAD_CONTENT_ELEMENTS.contains(&name.as_str()) => {
            open_start_tag(name, *self_closing, InsertionMode::InHead)
        }

        // "An end tag whose tag name is "head""
        // "Pop the current node (which will be the head element) off the stack of open elements."
        // "Switch the insertion mode to "after head"."
        Token::EndTag { name, .. } if name == "head" => {
            Transition::to(InsertionMode::AfterHead).with(TreeAction::PopUntil("head".to_owned()))
        }

        // "Any other end tag"
        // "Parse error. Ignore the token."
        Token::EndTag { name, .. } if !matches!(name.as_str(), "body" | "html" | "br") => {
            stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedEndTag))
        }

        // "Anything else"
        // "Pop the current node (which will be the head element) off the stack of open elements."
        // "Switch the insertion mode to "after head"."
        // "Reprocess the token."
        _ => Transition::to(InsertionMode::AfterHead)
            .with(TreeAction::PopUntil("head".to_owned()))
            .reprocess(),
    }
}

/// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
///
/// Insert the element for a start tag and, for elements whose contents are
/// text, switch to the "text" insertion mode. `origin` is the mode to stay in
/// or to come back to.
///
/// "A start tag whose tag name is one of: "base", "basefont", "bgsound", "link""
/// "Insert an HTML element for the token. Immediately pop the current node off
/// the stack of open elements."
///
/// "A start tag whose tag name is "title""
/// "Follow the generic RCDATA element parsing algorithm."
///
/// "A start tag whose tag name is one of: "noframes", "style""
/// "Follow the generic raw text element parsing algorithm."
fn open_start_tag(name: &str, self_closing: bool, origin: InsertionMode) -> Transition {
    let opens_text = TEXT_CONTENT_ELEMENTS.contains(&name) && !self_closing;
    let mut transition = Transition::to(if opens_text {
        InsertionMode::Text
    } else {
        origin
    });
    transition.actions = insert_start_tag(name, self_closing);
    if opens_text {
        transition = transition.with(TreeAction::SetOriginalMode(origin));
    }
    transition
}

/// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
fn after_head(token: &Token) -> Transition {
    let stay = Transition::to(InsertionMode::AfterHead);
    match token {
        // Whitespace: "Insert the character."
        Token::Character { data } if token.is_whitespace_character() => {
            stay.with(TreeAction::InsertCharacter(*data))
        }

        // "A comment token"
        // "Insert a comment."
        Token::Comment { data } => stay.with(comment(data, CommentTarget::CurrentNode)),

        // "A DOCTYPE token"
        // "Parse error. Ignore the token."
        Token::Doctype { .. } => stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedDoctype)),

        // "A start tag whose tag name is "html""
        // "Process the token using the rules for the "in body" insertion mode."
        //
        // "A start tag whose tag name is "head""
        // "Parse error. Ignore the token."
        Token::StartTag { name, .. } if name == "html" || name == "head" => {
            stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedStartTag))
        }

        // "A start tag whose tag name is "body""
        // "Insert an HTML element for the token."
        // "Switch the insertion mode to "in body"."
        Token::StartTag { name, .. } if name == "body" => {
            Transition::to(InsertionMode::InBody).with(open_element("body"))
        }

        // "A start tag whose tag name is one of: "base", "basefont", "bgsound", "link", "meta",
        // "noframes", "script", "style", "template", "title""
        // "Parse error."
        // "Push the node pointed to by the head element pointer onto the stack of open elements."
        // "Process the token using the rules for the "in head" insertion mode."
        // "Remove the node pointed to by the head element pointer from the stack of open
        // elements. (It might not be the current node at this point.)"
        Token::StartTag {
            name,
            self_closing,
        } if HEAD_CONTENT_ELEMENTS.contains(&name.as_str()) => {
            let inner = open_start_tag(name, *self_closing, InsertionMode::AfterHead);
            let mut actions = vec![
                TreeAction::ParseError(ParseErrorKind::UnexpectedStartTag),
                TreeAction::PushHead,
            ];
            actions.extend(inner.actions);
            actions.push(TreeAction::RemoveHead);
            Transition {
                mode: inner.mode,
                actions,
                reprocess: false,
            }
        }

        // "Any other end tag"
        // "Parse error. Ignore the token."
        Token::EndTag { name, .. } if !matches!(name.as_str(), "body" | "html" | "br") => {
            stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedEndTag))
        }

        // "Anything else"
        // "Insert an HTML element for a "body" start tag token with no attributes."
        // "Switch the insertion mode to "in body"."
        // "Reprocess the current token."
        _ => Transition::to(InsertionMode::InBody)
            .with(open_element("body"))
            .reprocess(),
    }
}

/// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
fn in_body(token: &Token, context: &TreeContext<'_>) -> Transition {
    let stay = Transition::to(InsertionMode::InBody);
    match token {
        // "A character token that is U+0000 NULL"
        // "Parse error. Ignore the token."
        Token::Character { data: '\0' } => {
            stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedNullCharacter))
        }

        // "Any other character token"
        // "Reconstruct the active formatting elements, if any."
        // "Insert the character."
        Token::Character { data } => stay.with(TreeAction::InsertCharacter(*data)),

        // "A comment token"
        // "Insert a comment."
        Token::Comment { data } => stay.with(comment(data, CommentTarget::CurrentNode)),

        // "A DOCTYPE token"
        // "Parse error. Ignore the token."
        Token::Doctype { .. } => stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedDoctype)),

        // "A start tag whose tag name is "html""
        // "Parse error."
        //
        // "A start tag whose tag name is "body""
        // "Parse error."
        //
        // Attributes are not kept, so there is nothing to merge into the
        // existing element.
        Token::StartTag { name, .. } if matches!(name.as_str(), "html" | "body" | "head") => {
            stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedStartTag))
        }

        // "A start tag whose tag name is one of: "base", "basefont", "bgsound", "link", "meta",
        // "noframes", "script", "style", "template", "title""
        // "Process the token using the rules for the "in head" insertion mode."
        Token::StartTag {
            name,
            self_closing,
        } if HEAD_CONTENT_ELEMENTS.contains(&name.as_str()) => {
            open_start_tag(name, *self_closing, InsertionMode::InBody)
        }

        // "Any other start tag"
        // "Reconstruct the active formatting elements, if any."
        // "Insert an HTML element for the token."
        Token::StartTag { name, self_closing } => {
            let mut actions = Vec::new();
            // "If the stack of open elements has a p element in button scope, then close a p
            // element."
            if CLOSES_P_ELEMENTS.contains(&name.as_str()) && context.has_open_element("p") {
                actions.extend(close_p_element(context));
            }
            // "If the current node is an HTML element whose tag name is one of "h1", "h2",
            // "h3", "h4", "h5", or "h6", then this is a parse error; pop the current node off
            // the stack of open elements."
            if HEADINGS.contains(&name.as_str())
                && context.current_node().is_some_and(|node| HEADINGS.contains(&node))
            {
                actions.push(TreeAction::ParseError(ParseErrorKind::UnexpectedStartTag));
                actions.push(TreeAction::PopCurrentNode);
            }
            let mut transition = open_start_tag(name, *self_closing, InsertionMode::InBody);
            actions.append(&mut transition.actions);
            transition.actions = actions;
            transition
        }

        // "An end tag whose tag name is "body""
        // "If the stack of open elements does not have a body element in scope, this is a parse
        // error; ignore the token."
        // "Switch the insertion mode to "after body"."
        Token::EndTag { name, .. } if name == "body" => {
            if context.has_open_element("body") {
                Transition::to(InsertionMode::AfterBody)
            } else {
                stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedEndTag))
            }
        }

        // "An end tag whose tag name is "html""
        // "If the stack of open elements does not have a body element in scope, this is a parse
        // error; ignore the token."
        // "Switch the insertion mode to "after body"."
        // "Reprocess the token."
        Token::EndTag { name, .. } if name == "html" => {
            if context.has_open_element("body") {
                Transition::to(InsertionMode::AfterBody).reprocess()
            } else {
                stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedEndTag))
            }
        }

        // "An end tag whose tag name is "p""
        // "If the stack of open elements does not have a p element in button scope, then this is
        // a parse error; insert an HTML element for a "p" start tag token with no attributes."
        // "Close a p element."
        Token::EndTag { name, .. } if name == "p" => {
            if context.has_open_element("p") {
                let mut transition = stay;
                transition.actions = close_p_element(context);
                transition
            } else {
                stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedEndTag))
                    .with(TreeAction::InsertElement {
                        tag_name: "p".to_owned(),
                        push: false,
                    })
            }
        }

        // "An end tag whose tag name is "br""
        // "Parse error. Drop the attributes from the token, and act as described in the next
        // entry; i.e. act as if this was a "br" start tag token with no attributes, rather than
        // the end tag token that it actually is."
        Token::EndTag { name, .. } if name == "br" => stay
            .with(TreeAction::ParseError(ParseErrorKind::UnexpectedEndTag))
            .with(TreeAction::InsertElement {
                tag_name: "br".to_owned(),
                push: false,
            }),

        // "Any other end tag"
        // "If node is an HTML element with the same tag name as the token, then: Generate
        // implied end tags, except for HTML elements with the same tag name as the token. If
        // node is not the current node, then this is a parse error. Pop all the nodes from the
        // current node up to node, including node, then stop these steps."
        Token::EndTag { name, .. } => {
            if name != "head" && context.has_open_element(name) {
                let mut transition = stay;
                if context.current_node() != Some(name.as_str()) {
                    transition = transition
                        .with(TreeAction::ParseError(ParseErrorKind::UnexpectedEndTag));
                }
                transition.with(TreeAction::PopUntil(name.clone()))
            } else {
                stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedEndTag))
            }
        }

        // "An end-of-file token"
        // "If there is a node in the stack of open elements that is not either a dd element, a
        // dt element, an li element, ... the body element, or the html element, then this is a
        // parse error."
        // "Stop parsing."
        Token::EndOfFile => {
            let mut transition = stay;
            if context
                .open_elements
                .iter()
                .any(|name| !MAY_REMAIN_OPEN_AT_EOF.contains(&name.as_str()))
            {
                transition = transition.with(TreeAction::ParseError(
                    ParseErrorKind::ExpectedClosingTagButGotEof,
                ));
            }
            transition.with(TreeAction::StopParsing)
        }
    }
}

/// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
///
/// Markup inside text-content elements is still tokenized as tags here, so
/// start tags, comments and DOCTYPEs between the element's tags are dropped.
fn text(token: &Token, context: &TreeContext<'_>) -> Transition {
    let stay = Transition::to(InsertionMode::Text);
    let original = context.original_mode.unwrap_or(InsertionMode::InBody);
    match token {
        // "A character token"
        // "Insert the token's character."
        Token::Character { data } => stay.with(TreeAction::InsertCharacter(*data)),

        // "An end-of-file token"
        // "Parse error."
        // "Pop the current node off the stack of open elements."
        // "Switch the insertion mode to the original insertion mode and reprocess the token."
        Token::EndOfFile => Transition::to(original)
            .with(TreeAction::ParseError(ParseErrorKind::ExpectedClosingTagButGotEof))
            .with(TreeAction::PopCurrentNode)
            .reprocess(),

        // "Any other end tag"
        // "Pop the current node off the stack of open elements."
        // "Switch the insertion mode to the original insertion mode."
        Token::EndTag { .. } => Transition::to(original).with(TreeAction::PopCurrentNode),

        Token::StartTag { .. } => stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedStartTag)),
        Token::Doctype { .. } => stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedDoctype)),
        Token::Comment { .. } => stay,
    }
}

/// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
fn after_body(token: &Token) -> Transition {
    let stay = Transition::to(InsertionMode::AfterBody);
    match token {
        // Whitespace: "Process the token using the rules for the "in body" insertion mode."
        Token::Character { data } if token.is_whitespace_character() => {
            stay.with(TreeAction::InsertCharacter(*data))
        }

        // "A comment token"
        // "Insert a comment as the last child of the first element in the stack of open elements
        // (the html element)."
        Token::Comment { data } => stay.with(comment(data, CommentTarget::HtmlElement)),

        // "A DOCTYPE token"
        // "Parse error. Ignore the token."
        Token::Doctype { .. } => stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedDoctype)),

        // "A start tag whose tag name is "html""
        // "Process the token using the rules for the "in body" insertion mode."
        Token::StartTag { name, .. } if name == "html" => {
            stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedStartTag))
        }

        // "An end tag whose tag name is "html""
        // "Switch the insertion mode to "after after body"."
        Token::EndTag { name, .. } if name == "html" => Transition::to(InsertionMode::AfterAfterBody),

        // "An end-of-file token"
        // "Stop parsing."
        Token::EndOfFile => stay.with(TreeAction::StopParsing),

        // "Anything else"
        // "Parse error. Switch the insertion mode to "in body" and reprocess the token."
        _ => Transition::to(InsertionMode::InBody)
            .with(TreeAction::ParseError(ParseErrorKind::UnexpectedContentAfterBody))
            .reprocess(),
    }
}

/// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
fn after_after_body(token: &Token) -> Transition {
    let stay = Transition::to(InsertionMode::AfterAfterBody);
    match token {
        // "A comment token"
        // "Insert a comment as the last child of the Document object."
        Token::Comment { data } => stay.with(comment(data, CommentTarget::Document)),

        // "A DOCTYPE token, a character token that is whitespace, a start tag whose tag name is
        // "html""
        // "Process the token using the rules for the "in body" insertion mode."
        Token::Doctype { .. } => stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedDoctype)),
        Token::Character { data } if token.is_whitespace_character() => {
            stay.with(TreeAction::InsertCharacter(*data))
        }
        Token::StartTag { name, .. } if name == "html" => {
            stay.with(TreeAction::ParseError(ParseErrorKind::UnexpectedStartTag))
        }

        // "An end-of-file token"
        // "Stop parsing."
        Token::EndOfFile => stay.with(TreeAction::StopParsing),

        // "Anything else"
        // "Parse error. Switch the insertion mode to "in body" and reprocess the token."
        _ => Transition::to(InsertionMode::InBody)
            .with(TreeAction::ParseError(ParseErrorKind::UnexpectedContentAfterBody))
            .reprocess(),
    }
}

// =============================================================================
// Shared steps
// =============================================================================

fn comment(data: &str, target: CommentTarget) -> TreeAction {
    TreeAction::InsertComment {
        data: data.to_owned(),
        target,
    }
}

fn open_element(tag_name: &str) -> TreeAction {
    TreeAction::InsertElement {
        tag_name: tag_name.to_owned(),
        push: true,
    }
}

/// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
///
/// Void elements are inserted and popped at once. A self-closing flag on
/// any other element is a parse error, and the element is not left open.
fn insert_start_tag(name: &str, self_closing: bool) -> Vec<TreeAction> {
    let void = VOID_ELEMENTS.contains(&name);
    let mut actions = Vec::with_capacity(2);
    if self_closing && !void {
        actions.push(TreeAction::ParseError(
            ParseErrorKind::NonVoidHtmlElementStartTagWithTrailingSolidus,
        ));
    }
    actions.push(TreeAction::InsertElement {
        tag_name: name.to_owned(),
        push: !void && !self_closing,
    });
    actions
}

/// [§ 13.2.6.4.7 Close a p element](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
///
/// "If the current node is not a p element, then this is a parse error."
/// "Pop elements from the stack of open elements until a p element has been
/// popped from the stack."
fn close_p_element(context: &TreeContext<'_>) -> Vec<TreeAction> {
    let mut actions = Vec::with_capacity(2);
    if context.current_node() != Some("p") {
        actions.push(TreeAction::ParseError(ParseErrorKind::UnexpectedEndTag));
    }
    actions.push(TreeAction::PopUntil("p".to_owned()));
    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(open: &[&str]) -> Vec<String> {
        open.iter().map(|name| (*name).to_owned()).collect()
    }

    fn start_tag(name: &str) -> Token {
        Token::StartTag {
            name: name.to_owned(),
            self_closing: false,
        }
    }

    #[test]
    fn test_initial_whitespace_is_ignored() {
        let names = context(&[]);
        let ctx = TreeContext {
            open_elements: &names,
            original_mode: None,
        };
        let result = transition(InsertionMode::Initial, &Token::new_character(' '), &ctx);
        assert_eq!(result, Transition::to(InsertionMode::Initial));
    }

    #[test]
    fn test_void_element_is_not_pushed() {
        let names = context(&["html", "body"]);
        let ctx = TreeContext {
            open_elements: &names,
            original_mode: None,
        };
        let result = transition(InsertionMode::InBody, &start_tag("br"), &ctx);
        assert_eq!(
            result.actions,
            vec![TreeAction::InsertElement {
                tag_name: "br".to_owned(),
                push: false
            }]
        );
    }

    #[test]
    fn test_block_start_tag_closes_open_p() {
        let names = context(&["html", "body", "p"]);
        let ctx = TreeContext {
            open_elements: &names,
            original_mode: None,
        };
        let result = transition(InsertionMode::InBody, &start_tag("div"), &ctx);
        assert_eq!(
            result.actions,
            vec![
                TreeAction::PopUntil("p".to_owned()),
                TreeAction::InsertElement {
                    tag_name: "div".to_owned(),
                    push: true
                },
            ]
        );
    }

    #[test]
    fn test_title_after_head_reopens_head() {
        let names = context(&["html"]);
        let ctx = TreeContext {
            open_elements: &names,
            original_mode: None,
        };
        let result = transition(InsertionMode::AfterHead, &start_tag("title"), &ctx);
        assert_eq!(result.mode, InsertionMode::Text);
        assert_eq!(
            result.actions.first(),
            Some(&TreeAction::ParseError(ParseErrorKind::UnexpectedStartTag))
        );
        assert_eq!(result.actions.get(1), Some(&TreeAction::PushHead));
        assert_eq!(result.actions.last(), Some(&TreeAction::RemoveHead));
        assert!(
            result
                .actions
                .contains(&TreeAction::SetOriginalMode(InsertionMode::AfterHead))
        );
    }

    #[test]
    fn test_open_element_is_found_anywhere_on_the_stack() {
        let names = context(&["html", "body", "p", "span", "em"]);
        let ctx = TreeContext {
            open_elements: &names,
            original_mode: None,
        };
        assert!(ctx.has_open_element("p"));
        assert!(!ctx.has_open_element("div"));

        let result = transition(
            InsertionMode::InBody,
            &Token::EndTag {
                name: "p".to_owned(),
                self_closing: false,
            },
            &ctx,
        );
        assert_eq!(
            result.actions.last(),
            Some(&TreeAction::PopUntil("p".to_owned()))
        );
    }

    #[test]
    fn test_text_mode_closes_on_any_end_tag() {
        let names = context(&["html", "head", "title"]);
        let ctx = TreeContext {
            open_elements: &names,
            original_mode: Some(InsertionMode::InHead),
        };
        let result = transition(
            InsertionMode::Text,
            &Token::EndTag {
                name: "div".to_owned(),
                self_closing: false,
            },
            &ctx,
        );
        assert_eq!(
            result,
            Transition::to(InsertionMode::InHead).with(TreeAction::PopCurrentNode)
        );
    }

    #[test]
    fn test_text_mode_end_tag_returns_to_original_mode() {
        let names = context(&["html", "head", "title"]);
        let ctx = TreeContext {
            open_elements: &names,
            original_mode: Some(InsertionMode::InHead),
        };
        let result = transition(InsertionMode::Text, &Token::EndTag {
                name: "title".to_owned(),
                self_closing: false,
            }, &ctx);
        assert_eq!(
            result,
            Transition::to(InsertionMode::InHead).with(TreeAction::PopCurrentNode)
        );
    }
}
