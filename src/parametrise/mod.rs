use lazy_static::lazy_static;
use regex::Regex;

mod scanner;

use scanner::{State, is_block_comment_start, is_line_comment_start, step_quoted};

use crate::error::SqlTypegenError;

lazy_static! {
    static ref PARAMETER_NAME: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// SQL text with every parameter as a positional `?`, plus one name per parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParametrisedSql {
    pub sql: String,
    pub parameter_names: Vec<String>,
}

/// Rewrite `{name}` parameters to `?` and name every parameter in order.
///
/// Bare `?` parameters are named `p0`, `p1`, ... after their position; a
/// numbered `?NNN` names slot NNN once however often it repeats. Quoted
/// strings, quoted identifiers and comments are left untouched.
///
/// ```rust
/// use sql_typegen::parametrise::parametrise;
///
/// let p = parametrise("SELECT * FROM t WHERE a > {lower} AND b < ?").unwrap();
/// assert_eq!(p.sql, "SELECT * FROM t WHERE a > ? AND b < ?");
/// assert_eq!(p.parameter_names, vec!["lower", "p1"]);
/// ```
///
/// # Errors
/// Returns `SqlTypegenError::ParameterError` for an unterminated `{`, a name that
/// is not an identifier or contains `.`, or a duplicate name.
pub fn parametrise(sql: &str) -> Result<ParametrisedSql, SqlTypegenError> {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut names: Vec<String> = Vec::new();
    let mut state = State::Normal;
    let mut copied = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        match state {
            State::Normal => match bytes[idx] {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                _ if is_line_comment_start(bytes, idx) => {
                    state = State::LineComment;
                    idx += 1;
                }
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'?' => {
                    let digits = bytes[idx + 1..]
                        .iter()
                        .take_while(|b| b.is_ascii_digit())
                        .count();
                    if digits == 0 {
                        let automatic = format!("p{}", names.len());
                        add_parameter_name(&mut names, &automatic)?;
                    } else {
                        let number = &sql[idx + 1..idx + 1 + digits];
                        claim_numbered_slot(&mut names, number)?;
                        idx += digits;
                    }
                }
                b'{' => {
                    let close = sql[idx + 1..]
                        .find('}')
                        .map(|offset| idx + 1 + offset)
                        .ok_or_else(|| {
                            SqlTypegenError::ParameterError(format!(
                                "missing closing '}}' for parameter started at position {idx} in {sql}"
                            ))
                        })?;
                    add_parameter_name(&mut names, sql[idx + 1..close].trim())?;
                    out.push_str(&sql[copied..idx]);
                    out.push('?');
                    idx = close;
                    copied = close + 1;
                }
                _ => {}
            },
            _ => {
                let (next, consumed) = step_quoted(state, bytes, idx);
                state = next;
                idx += consumed;
            }
        }
        idx += 1;
    }
    out.push_str(&sql[copied.min(sql.len())..]);

    Ok(ParametrisedSql {
        sql: out,
        parameter_names: names,
    })
}

/// `?NNN` binds slot NNN; repeats reuse the slot and skipped slots get automatic names.
fn claim_numbered_slot(names: &mut Vec<String>, number: &str) -> Result<(), SqlTypegenError> {
    let slot: usize = match number.parse() {
        Ok(slot) if slot > 0 => slot,
        _ => {
            return Err(SqlTypegenError::ParameterError(format!(
                "numbered parameter ?{number} is out of range"
            )));
        }
    };
    while names.len() < slot {
        let automatic = format!("p{}", names.len());
        add_parameter_name(names, &automatic)?;
    }
    Ok(())
}

fn add_parameter_name(names: &mut Vec<String>, name: &str) -> Result<(), SqlTypegenError> {
    if name.contains('.') {
        return Err(SqlTypegenError::ParameterError(format!(
            "parameter name {name} must not contain '.'"
        )));
    }
    if !PARAMETER_NAME.is_match(name) {
        return Err(SqlTypegenError::ParameterError(format!(
            "parameter name {name} is not a valid identifier"
        )));
    }
    if names.iter().any(|n| n == name) {
        return Err(SqlTypegenError::ParameterError(format!(
            "duplicate parameter name {name}"
        )));
    }
    names.push(name.to_string());
    Ok(())
}

/// Replace every `$$` in `sql` with the table-name prefix.
#[must_use]
pub fn replace_table_names(sql: &str, prefix: &str) -> String {
    sql.replace("$$", prefix)
}
