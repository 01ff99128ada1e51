use log::warn;
use thiserror::Error;

use crate::ast::*;
use crate::lexer::{Lexer, Span, Token, TokenKind};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Objective must have the form 'Maximize Z = ...': missing '='")]
    MissingEquals,
    #[error("Constraint must have the form '... <= number': missing '<='")]
    MissingRelation,
    #[error("Unsupported relation '{0}': only '<=' constraints are supported")]
    UnsupportedRelation(String),
    #[error("Invalid number: '{0}'")]
    InvalidNumber(String),
    #[error("Unknown term '{term}' at position {span:?}")]
    UnknownTerm { term: String, span: Span },
}

/// How to treat terms that name no known variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Skip them, recording the text in [`LinearExpression::ignored`]
    #[default]
    Lenient,
    /// Reject them with [`ParseError::UnknownTerm`]
    Strict,
}

/// Parser for objective and constraint text over a fixed variable vocabulary
#[derive(Debug, Clone, Default)]
pub struct Parser {
    vocabulary: Vocabulary,
    mode: ParseMode,
}

impl Parser {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary,
            mode: ParseMode::Lenient,
        }
    }

    pub fn strict(mut self) -> Self {
        self.mode = ParseMode::Strict;
        self
    }

    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Parse `"<Maximize|Minimize> Z = <term> (+ <term>)*"`.
    ///
    /// The direction is Maximize when the text left of `=` contains
    /// "maximize" in any case, and Minimize otherwise.
    pub fn parse_objective(&self, source: &str) -> Result<ObjectiveFunction, ParseError> {
        let tokens = Lexer::tokenize(source);
        let eq = tokens
            .iter()
            .position(|t| t.kind == TokenKind::Eq)
            .ok_or(ParseError::MissingEquals)?;

        let head = &source[..tokens[eq].span.start];
        let direction = if head.to_lowercase().contains("maximize") {
            Direction::Maximize
        } else {
            Direction::Minimize
        };

        let expression = self.parse_expression(source, &tokens[eq + 1..])?;
        Ok(ObjectiveFunction {
            direction,
            expression,
        })
    }

    /// Parse `"<term> (+ <term>)* <= <number>"`. `position` is the
    /// zero-based index of the constraint and names its slack variable.
    pub fn parse_constraint(
        &self,
        source: &str,
        position: usize,
    ) -> Result<ConstraintExpr, ParseError> {
        let tokens = Lexer::tokenize(source);
        let Some(le) = tokens.iter().position(|t| t.kind == TokenKind::Le) else {
            return match tokens.iter().find(|t| t.kind.is_relation()) {
                Some(t) => Err(ParseError::UnsupportedRelation(t.text.clone())),
                None => Err(ParseError::MissingRelation),
            };
        };

        let lhs = self.parse_expression(source, &tokens[..le])?;

        let rhs_text = source[tokens[le].span.end..].trim();
        let rhs = rhs_text
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ParseError::InvalidNumber(rhs_text.to_string()))?;

        Ok(ConstraintExpr {
            lhs,
            relation: Relation::Le,
            rhs,
            slack: format!("s{}", position + 1),
            slack_coefficient: 1.0,
        })
    }

    pub fn parse_constraints<S: AsRef<str>>(
        &self,
        sources: &[S],
    ) -> Result<Vec<ConstraintExpr>, ParseError> {
        sources
            .iter()
            .enumerate()
            .map(|(i, s)| self.parse_constraint(s.as_ref(), i))
            .collect()
    }

    /// Split `tokens` on `+` and read each piece as a term.
    ///
    /// A term is `[-] [number] [*] variable`, or a bare number which becomes
    /// the constant. A later term for the same variable overwrites the
    /// earlier coefficient.
    fn parse_expression(
        &self,
        source: &str,
        tokens: &[Token],
    ) -> Result<LinearExpression, ParseError> {
        let mut expression = LinearExpression::default();

        let tokens = match tokens.last() {
            Some(t) if t.kind == TokenKind::Eof => &tokens[..tokens.len() - 1],
            _ => tokens,
        };

        for term in tokens.split(|t| t.kind == TokenKind::Plus) {
            if term.is_empty() {
                continue;
            }
            self.parse_term(source, term, &mut expression)?;
        }

        Ok(expression)
    }

    fn parse_term(
        &self,
        source: &str,
        term: &[Token],
        expression: &mut LinearExpression,
    ) -> Result<(), ParseError> {
        let mut pos = 0;
        let mut sign = 1.0;
        if term[pos].kind == TokenKind::Minus {
            sign = -1.0;
            pos += 1;
        }

        let mut coefficient = None;
        let mut starred = false;
        if let Some(t) = term.get(pos).filter(|t| t.kind == TokenKind::Number) {
            coefficient = Some(
                t.text
                    .parse::<f64>()
                    .map_err(|_| ParseError::InvalidNumber(t.text.clone()))?,
            );
            pos += 1;
            if term.get(pos).is_some_and(|t| t.kind == TokenKind::Star) {
                starred = true;
                pos += 1;
            }
        }

        match term.get(pos) {
            Some(t) if t.kind == TokenKind::Ident && self.vocabulary.contains(&t.text) => {
                expression
                    .coefficients
                    .insert(t.text.clone(), sign * coefficient.unwrap_or(1.0));
                pos += 1;
            }
            // `3*` with nothing after the star is not a constant
            None if coefficient.is_some() && !starred => {
                expression.constant = coefficient.map(|c| sign * c);
            }
            _ => return self.unknown(source, term, expression),
        }

        if pos < term.len() {
            self.unknown(source, &term[pos..], expression)?;
        }
        Ok(())
    }

    fn unknown(
        &self,
        source: &str,
        fragment: &[Token],
        expression: &mut LinearExpression,
    ) -> Result<(), ParseError> {
        let span = fragment[0].span.merge(fragment[fragment.len() - 1].span);
        let text = source[span.start..span.end].to_string();
        match self.mode {
            ParseMode::Strict => Err(ParseError::UnknownTerm { term: text, span }),
            ParseMode::Lenient => {
                warn!("Ignoring unrecognized term '{text}'");
                expression.ignored.push(text);
                Ok(())
            }
        }
    }
}
