//! Recursive descent parser for filter expressions.

use crate::FilterError;
use crate::expr::{BinaryOp, Expr, StrMethod, UnaryOp};
use crate::token::Token;
use crate::value::Value;

fn syntax(message: impl Into<String>) -> FilterError {
  FilterError::Syntax {
    message: message.into(),
  }
}

pub(crate) fn parse(tokens: Vec<Token>) -> Result<Expr, FilterError> {
  let mut parser = Parser { tokens, pos: 0 };
  let expr = parser.parse_or()?;
  match parser.peek(0) {
    None => Ok(expr),
    Some(token) => Err(syntax(format!(
      "unexpected {} after expression",
      token.describe()
    ))),
  }
}

struct Parser {
  tokens: Vec<Token>,
  pos: usize,
}

impl Parser {
  fn peek(&self, offset: usize) -> Option<&Token> {
    self.tokens.get(self.pos + offset)
  }

  fn advance(&mut self) -> Option<Token> {
    let token = self.tokens.get(self.pos).cloned();
    if token.is_some() {
      self.pos += 1;
    }
    token
  }

  fn expect(&mut self, want: Token) -> Result<(), FilterError> {
    match self.advance() {
      Some(token) if token == want => Ok(()),
      Some(token) => Err(syntax(format!(
        "expected {} but found {}",
        want.describe(),
        token.describe()
      ))),
      None => Err(syntax(format!(
        "expected {} but filter ended",
        want.describe()
      ))),
    }
  }

  fn parse_or(&mut self) -> Result<Expr, FilterError> {
    let mut lhs = self.parse_and()?;
    while self.peek(0) == Some(&Token::Or) {
      self.advance();
      let rhs = self.parse_and()?;
      lhs = Expr::Binary {
        op: BinaryOp::Or,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
      };
    }
    Ok(lhs)
  }

  fn parse_and(&mut self) -> Result<Expr, FilterError> {
    let mut lhs = self.parse_cmp()?;
    while self.peek(0) == Some(&Token::And) {
      self.advance();
      let rhs = self.parse_cmp()?;
      lhs = Expr::Binary {
        op: BinaryOp::And,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
      };
    }
    Ok(lhs)
  }

  fn parse_cmp(&mut self) -> Result<Expr, FilterError> {
    let lhs = self.parse_unary()?;
    let op = match self.peek(0) {
      Some(Token::Eq) => BinaryOp::Eq,
      Some(Token::Ne) => BinaryOp::Ne,
      Some(Token::Lt) => BinaryOp::Lt,
      Some(Token::Le) => BinaryOp::Le,
      Some(Token::Gt) => BinaryOp::Gt,
      Some(Token::Ge) => BinaryOp::Ge,
      _ => return Ok(lhs),
    };
    self.advance();
    let rhs = self.parse_unary()?;
    Ok(Expr::Binary {
      op,
      lhs: Box::new(lhs),
      rhs: Box::new(rhs),
    })
  }

  fn parse_unary(&mut self) -> Result<Expr, FilterError> {
    if self.peek(0) == Some(&Token::Not) {
      self.advance();
      let expr = self.parse_unary()?;
      return Ok(Expr::Unary {
        op: UnaryOp::Not,
        expr: Box::new(expr),
      });
    }
    self.parse_postfix()
  }

  fn parse_postfix(&mut self) -> Result<Expr, FilterError> {
    let mut expr = self.parse_primary()?;
    loop {
      match self.peek(0) {
        Some(Token::LBracket) => {
          self.advance();
          let key = self.parse_or()?;
          self.expect(Token::RBracket)?;
          expr = Expr::Index {
            recv: Box::new(expr),
            key: Box::new(key),
          };
        }
        Some(Token::Dot) => {
          // Only a method call may follow here; plain path segments were
          // consumed by parse_primary.
          self.advance();
          let name = match self.advance() {
            Some(Token::Ident(name)) => name,
            Some(token) => {
              return Err(syntax(format!(
                "expected method name but found {}",
                token.describe()
              )));
            }
            None => return Err(syntax("expected method name but filter ended")),
          };
          let method = StrMethod::from_name(&name)
            .ok_or_else(|| syntax(format!("unknown method '{name}'")))?;
          self.expect(Token::LParen)?;
          let arg = self.parse_or()?;
          self.expect(Token::RParen)?;
          expr = Expr::Method {
            recv: Box::new(expr),
            method,
            arg: Box::new(arg),
          };
        }
        _ => return Ok(expr),
      }
    }
  }

  fn parse_primary(&mut self) -> Result<Expr, FilterError> {
    match self.advance() {
      Some(Token::Str(s)) => Ok(Expr::Literal(Value::String(s))),
      Some(Token::Int(n)) => Ok(Expr::Literal(Value::Int(n))),
      Some(Token::True) => Ok(Expr::Literal(Value::Bool(true))),
      Some(Token::False) => Ok(Expr::Literal(Value::Bool(false))),
      Some(Token::LParen) => {
        let expr = self.parse_or()?;
        self.expect(Token::RParen)?;
        Ok(expr)
      }
      Some(Token::Ident(first)) => self.parse_path(first),
      Some(token) => Err(syntax(format!("unexpected {}", token.describe()))),
      None => Err(syntax("empty expression")),
    }
  }

  /// Consume `first(.segment)*` into a single field path, stopping
  /// before a `.method(` so the postfix loop can pick it up.
  fn parse_path(&mut self, first: String) -> Result<Expr, FilterError> {
    let mut path = first;
    while self.peek(0) == Some(&Token::Dot) {
      let Some(Token::Ident(segment)) = self.peek(1) else {
        break;
      };
      if self.peek(2) == Some(&Token::LParen) {
        break;
      }
      let segment = segment.clone();
      self.advance();
      self.advance();
      path.push('.');
      path.push_str(&segment);
    }
    Ok(Expr::Field(path))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::token::tokenize;

  fn parse_str(input: &str) -> Result<Expr, FilterError> {
    parse(tokenize(input)?)
  }

  #[test]
  fn parses_dotted_paths() {
    let expr = parse_str(r#"metadata.name == "foo""#).unwrap();
    assert_eq!(
      expr,
      Expr::Binary {
        op: BinaryOp::Eq,
        lhs: Box::new(Expr::Field("metadata.name".to_string())),
        rhs: Box::new(Expr::Literal(Value::String("foo".to_string()))),
      }
    );
  }

  #[test]
  fn parses_method_on_dotted_path() {
    let expr = parse_str(r#"metadata.name.endsWith("run")"#).unwrap();
    assert_eq!(
      expr,
      Expr::Method {
        recv: Box::new(Expr::Field("metadata.name".to_string())),
        method: StrMethod::EndsWith,
        arg: Box::new(Expr::Literal(Value::String("run".to_string()))),
      }
    );
  }

  #[test]
  fn parses_map_index() {
    let expr = parse_str(r#"annotations["team"] == "infra""#).unwrap();
    match expr {
      Expr::Binary { op: BinaryOp::Eq, lhs, .. } => {
        assert_eq!(
          *lhs,
          Expr::Index {
            recv: Box::new(Expr::Field("annotations".to_string())),
            key: Box::new(Expr::Literal(Value::String("team".to_string()))),
          }
        );
      }
      other => panic!("unexpected expr: {other:?}"),
    }
  }

  #[test]
  fn or_binds_looser_than_and() {
    let expr = parse_str("true || false && false").unwrap();
    match expr {
      Expr::Binary { op: BinaryOp::Or, rhs, .. } => {
        assert!(matches!(*rhs, Expr::Binary { op: BinaryOp::And, .. }));
      }
      other => panic!("unexpected expr: {other:?}"),
    }
  }

  #[test]
  fn rejects_trailing_tokens() {
    assert!(matches!(
      parse_str(r#"name == "a" name"#),
      Err(FilterError::Syntax { .. })
    ));
  }

  #[test]
  fn rejects_unknown_method() {
    assert!(matches!(
      parse_str(r#"name.matches("a")"#),
      Err(FilterError::Syntax { .. })
    ));
  }

  #[test]
  fn rejects_dangling_operator() {
    assert!(matches!(
      parse_str("name =="),
      Err(FilterError::Syntax { .. })
    ));
  }
}
