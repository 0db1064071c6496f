//! Recursive-descent parser for the query grammar:
//!
//! ```text
//! Query    := '?' Target { Evidence } { DoList } [ Argmax ]
//! Target   := NodeEq | Argmax
//! NodeEq   := ID '=' ID
//! Evidence := '|' NodeEq { ',' NodeEq }
//! DoList   := '!' 'do' NodeEq { 'do' NodeEq }
//! Argmax   := 'argmax' '(' ID { ',' ID } ')'
//! ```
//!
//! Tokens are whitespace-separated; identifiers must be node and value
//! names already registered in the network.

use hashbrown::HashMap;

use crate::{errors::ParseError, network::Network, query::QueryExecuter};

/// Parser over one query line, bound to the network whose names it
/// resolves.
pub struct Parser<'a> {
    tokens: Vec<&'a str>,
    position: usize,
    network: &'a Network,
}

impl<'a> Parser<'a> {
    /// Creates a parser over the given input line.
    pub fn new(input: &'a str, network: &'a Network) -> Self {
        Self { tokens: input.split_whitespace().collect(), position: 0, network }
    }

    /// Parses the query into an executable plan.
    ///
    /// # Errors
    ///
    /// * If the input violates the grammar or references unknown names.
    pub fn parse_query(mut self) -> Result<QueryExecuter, ParseError> {
        let mut plan = QueryExecuter::default();

        self.expect("?")?;
        if self.peek() == Some("argmax") {
            self.parse_argmax(&mut plan.argmax_nodes)?;
        } else {
            self.parse_node_eq(&mut plan.query_nodes, &mut plan.query_assignment)?;
        }

        while let Some(token) = self.peek() {
            match token {
                "|" => {
                    self.position += 1;
                    self.parse_node_eq(&mut plan.condition_nodes, &mut plan.condition_assignment)?;
                    while self.peek() == Some(",") {
                        self.position += 1;
                        self.parse_node_eq(
                            &mut plan.condition_nodes,
                            &mut plan.condition_assignment,
                        )?;
                    }
                }
                "!" => {
                    self.position += 1;
                    self.expect("do")?;
                    self.parse_node_eq(
                        &mut plan.intervention_nodes,
                        &mut plan.intervention_assignment,
                    )?;
                    while self.peek() == Some("do") {
                        self.position += 1;
                        self.parse_node_eq(
                            &mut plan.intervention_nodes,
                            &mut plan.intervention_assignment,
                        )?;
                    }
                }
                "argmax" => self.parse_argmax(&mut plan.argmax_nodes)?,
                other => {
                    return Err(ParseError::UnexpectedToken {
                        token: other.to_owned(),
                        position: self.position,
                    });
                }
            }
        }

        Ok(plan)
    }

    /// Parses `ID '=' ID`, resolving both identifiers against the network.
    fn parse_node_eq(
        &mut self,
        nodes: &mut Vec<usize>,
        assignment: &mut HashMap<usize, usize>,
    ) -> Result<(), ParseError> {
        let name = self.next_token("a node name")?;
        let id = self.network.get_index(name)?;
        self.expect("=")?;
        let label = self.next_token("a value name")?;
        let value = self.network.node(id).value_index(label)?;
        if !nodes.contains(&id) {
            nodes.push(id);
        }
        assignment.insert(id, value);
        Ok(())
    }

    /// Parses `'argmax' '(' ID { ',' ID } ')'`.
    fn parse_argmax(&mut self, nodes: &mut Vec<usize>) -> Result<(), ParseError> {
        self.expect("argmax")?;
        self.expect("(")?;
        loop {
            let name = self.next_token("a node name")?;
            let id = self.network.get_index(name)?;
            if !nodes.contains(&id) {
                nodes.push(id);
            }
            match self.next_token("`,` or `)`")? {
                "," => {}
                ")" => return Ok(()),
                other => {
                    return Err(ParseError::UnexpectedToken {
                        token: other.to_owned(),
                        position: self.position - 1,
                    });
                }
            }
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.position).copied()
    }

    fn next_token(&mut self, expected: &'static str) -> Result<&'a str, ParseError> {
        let token = self.peek().ok_or(ParseError::UnexpectedEnd { expected })?;
        self.position += 1;
        Ok(token)
    }

    fn expect(&mut self, literal: &'static str) -> Result<(), ParseError> {
        match self.peek() {
            Some(token) if token == literal => {
                self.position += 1;
                Ok(())
            }
            Some(token) => Err(ParseError::UnexpectedToken {
                token: token.to_owned(),
                position: self.position,
            }),
            None => Err(ParseError::UnexpectedEnd { expected: literal }),
        }
    }
}
