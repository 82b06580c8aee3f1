//! Lexer for filter expressions.

use crate::FilterError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
  Ident(String),
  Str(String),
  Int(i64),
  True,
  False,
  Eq,
  Ne,
  Lt,
  Le,
  Gt,
  Ge,
  And,
  Or,
  Not,
  Dot,
  LParen,
  RParen,
  LBracket,
  RBracket,
}

impl Token {
  pub(crate) fn describe(&self) -> String {
    match self {
      Token::Ident(name) => format!("identifier '{name}'"),
      Token::Str(_) => "string literal".to_string(),
      Token::Int(n) => format!("integer {n}"),
      other => format!("'{}'", other.symbol()),
    }
  }

  fn symbol(&self) -> &'static str {
    match self {
      Token::True => "true",
      Token::False => "false",
      Token::Eq => "==",
      Token::Ne => "!=",
      Token::Lt => "<",
      Token::Le => "<=",
      Token::Gt => ">",
      Token::Ge => ">=",
      Token::And => "&&",
      Token::Or => "||",
      Token::Not => "!",
      Token::Dot => ".",
      Token::LParen => "(",
      Token::RParen => ")",
      Token::LBracket => "[",
      Token::RBracket => "]",
      Token::Ident(_) | Token::Str(_) | Token::Int(_) => "",
    }
  }
}

fn syntax(message: impl Into<String>) -> FilterError {
  FilterError::Syntax {
    message: message.into(),
  }
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, FilterError> {
  let mut tokens = Vec::new();
  let mut chars = input.chars().peekable();

  while let Some(&c) = chars.peek() {
    match c {
      c if c.is_whitespace() => {
        chars.next();
      }
      '(' => {
        chars.next();
        tokens.push(Token::LParen);
      }
      ')' => {
        chars.next();
        tokens.push(Token::RParen);
      }
      '[' => {
        chars.next();
        tokens.push(Token::LBracket);
      }
      ']' => {
        chars.next();
        tokens.push(Token::RBracket);
      }
      '.' => {
        chars.next();
        tokens.push(Token::Dot);
      }
      '=' => {
        chars.next();
        match chars.next() {
          Some('=') => tokens.push(Token::Eq),
          _ => return Err(syntax("expected '==' (single '=' is not an operator)")),
        }
      }
      '!' => {
        chars.next();
        if chars.peek() == Some(&'=') {
          chars.next();
          tokens.push(Token::Ne);
        } else {
          tokens.push(Token::Not);
        }
      }
      '<' => {
        chars.next();
        if chars.peek() == Some(&'=') {
          chars.next();
          tokens.push(Token::Le);
        } else {
          tokens.push(Token::Lt);
        }
      }
      '>' => {
        chars.next();
        if chars.peek() == Some(&'=') {
          chars.next();
          tokens.push(Token::Ge);
        } else {
          tokens.push(Token::Gt);
        }
      }
      '&' => {
        chars.next();
        match chars.next() {
          Some('&') => tokens.push(Token::And),
          _ => return Err(syntax("expected '&&'")),
        }
      }
      '|' => {
        chars.next();
        match chars.next() {
          Some('|') => tokens.push(Token::Or),
          _ => return Err(syntax("expected '||'")),
        }
      }
      '"' | '\'' => {
        tokens.push(lex_string(&mut chars)?);
      }
      c if c.is_ascii_digit() => {
        tokens.push(lex_int(&mut chars)?);
      }
      c if c.is_ascii_alphabetic() || c == '_' => {
        let mut ident = String::new();
        while let Some(&c) = chars.peek() {
          if c.is_ascii_alphanumeric() || c == '_' {
            ident.push(c);
            chars.next();
          } else {
            break;
          }
        }
        tokens.push(match ident.as_str() {
          "true" => Token::True,
          "false" => Token::False,
          _ => Token::Ident(ident),
        });
      }
      c => return Err(syntax(format!("unexpected character '{c}'"))),
    }
  }

  Ok(tokens)
}

fn lex_string(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<Token, FilterError> {
  let quote = chars.next().unwrap_or('"');
  let mut value = String::new();
  loop {
    match chars.next() {
      Some(c) if c == quote => return Ok(Token::Str(value)),
      Some('\\') => match chars.next() {
        Some('n') => value.push('\n'),
        Some('t') => value.push('\t'),
        Some(c @ ('\\' | '"' | '\'')) => value.push(c),
        Some(c) => return Err(syntax(format!("unsupported escape '\\{c}'"))),
        None => return Err(syntax("unterminated string literal")),
      },
      Some(c) => value.push(c),
      None => return Err(syntax("unterminated string literal")),
    }
  }
}

fn lex_int(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<Token, FilterError> {
  let mut digits = String::new();
  while let Some(&c) = chars.peek() {
    if c.is_ascii_digit() {
      digits.push(c);
      chars.next();
    } else {
      break;
    }
  }
  digits
    .parse::<i64>()
    .map(Token::Int)
    .map_err(|_| syntax(format!("integer literal '{digits}' out of range")))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tokenizes_a_typical_filter() {
    let tokens = tokenize(r#"api_version == "v1beta1" && !(name < 'x')"#).unwrap();
    assert_eq!(
      tokens,
      vec![
        Token::Ident("api_version".to_string()),
        Token::Eq,
        Token::Str("v1beta1".to_string()),
        Token::And,
        Token::Not,
        Token::LParen,
        Token::Ident("name".to_string()),
        Token::Lt,
        Token::Str("x".to_string()),
        Token::RParen,
      ]
    );
  }

  #[test]
  fn rejects_single_equals() {
    assert!(matches!(
      tokenize("name = \"x\""),
      Err(FilterError::Syntax { .. })
    ));
  }

  #[test]
  fn rejects_unterminated_string() {
    assert!(matches!(
      tokenize("name == \"abc"),
      Err(FilterError::Syntax { .. })
    ));
  }
}
