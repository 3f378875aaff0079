use crate::{Error, Node, Tree};
use derive_more::From;
use std::fmt::{self, Display, Formatter};
use std::hash::Hash;
use std::str::FromStr;

/// An owned ordered tree with a label on every node.
///
/// `LabeledTree<String>` reads and writes the bracket notation, where every node is written as
/// its label followed by its children, enclosed in braces.
///
/// ```rust
/// use rted::LabeledTree;
///
/// let t: LabeledTree<String> = "{a{b}{c{d}}}".parse()?;
/// assert_eq!(t.children.len(), 2);
/// assert_eq!(t.to_string(), "{a{b}{c{d}}}");
/// # Ok::<(), rted::Error>(())
/// ```
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, From)]
pub struct LabeledTree<L> {
    pub label: L,
    pub children: Vec<LabeledTree<L>>,
}

impl<L> LabeledTree<L> {
    /// A node with the given children, in order.
    ///
    /// ```rust
    /// use rted::LabeledTree;
    ///
    /// let t = LabeledTree::new("a", vec![LabeledTree::leaf("b"), LabeledTree::leaf("c")]);
    /// assert_eq!(t.to_string(), "{a{b}{c}}");
    /// ```
    pub fn new(label: L, children: Vec<Self>) -> Self {
        LabeledTree { label, children }
    }

    /// A node without children.
    pub fn leaf(label: L) -> Self {
        Self::new(label, Vec::new())
    }
}

impl<L: Eq + Hash> Node for LabeledTree<L> {
    type Label<'l> = &'l L
    where
        Self: 'l;

    fn label(&self) -> Self::Label<'_> {
        &self.label
    }
}

impl<L: Eq + Hash> Tree for LabeledTree<L> {
    type Children<'c> = &'c [Self]
    where
        Self: 'c;

    fn children(&self) -> Self::Children<'_> {
        &self.children
    }
}

impl<L: Display> Display for LabeledTree<L> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}", self.label)?;
        for c in &self.children {
            write!(f, "{c}")?;
        }

        write!(f, "}}")
    }
}

struct Parser<'s> {
    input: &'s str,
    offset: usize,
}

impl Parser<'_> {
    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.offset += 1;
        }
    }

    fn error(&self, reason: &'static str) -> Error {
        Error::Syntax {
            offset: self.offset,
            reason,
        }
    }

    fn tree(&mut self) -> Result<LabeledTree<String>, Error> {
        if self.peek() != Some(b'{') {
            return Err(self.error("expected an opening brace"));
        }

        self.offset += 1;
        let start = self.offset;
        while !matches!(self.peek(), None | Some(b'{' | b'}')) {
            self.offset += 1;
        }

        let label = self.input[start..self.offset].to_owned();

        let mut children = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'{') => children.push(self.tree()?),
                Some(b'}') => {
                    self.offset += 1;
                    return Ok(LabeledTree { label, children });
                }
                Some(_) => return Err(self.error("unexpected text between children")),
                None => return Err(self.error("unbalanced braces")),
            }
        }
    }
}

impl FromStr for LabeledTree<String> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser {
            input: s,
            offset: 0,
        };

        parser.skip_whitespace();
        let tree = parser.tree()?;
        parser.skip_whitespace();

        if parser.offset < s.len() {
            return Err(parser.error("trailing input"));
        }

        Ok(tree)
    }
}
