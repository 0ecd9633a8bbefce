//! A single-pass, character-driven parser for one instruction line.
//!
//! Grammar: `$name: optype(argname=$target.attr | argname=<float>, ...)`.
//! Whitespace is only tolerated right after the `:` and right after a `,`;
//! everywhere else a stray space is a syntax error. Anything past the
//! closing `)` is ignored, so a line can carry a trailing comment.

use crate::error::ParseError;

/// One argument in an instruction's argument list.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// `argname=<float>` -- a literal value.
    Literal { name: String, value: f64 },
    /// `argname=$target.attr` -- a reference to another operation's
    /// output socket.
    Reference {
        name: String,
        target: String,
        output: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Dollar,
    Name,
    Colon,
    Optype,
    Args,
    ArgsName,
    ArgsEqual,
    ArgsDollar,
    ArgsTarget,
    ArgsDot,
    ArgsAttr,
    ArgsComma,
    ArgsFloat,
    FloatDot,
    FloatDecimal,
    Finish,
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_alnum_underscore(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Parses one instruction into `(optype, name, args)`.
///
/// `name` comes before `args` in the grammar but is returned second, to
/// match the order downstream code consumes them in: the operation type is
/// needed first, to look up its declared input sockets.
pub fn parse_instruction(instr: &str) -> Result<(String, String, Vec<Arg>), ParseError> {
    let mut state = State::Start;

    let mut name = String::new();
    let mut optype = String::new();
    let mut args = Vec::new();
    let mut arg_name = String::new();
    let mut arg_target = String::new();
    let mut arg_attr = String::new();
    let mut arg_float = String::new();

    for (i, c) in instr.chars().enumerate() {
        match state {
            State::Start => {
                if c == '$' {
                    state = State::Dollar;
                } else {
                    return Err(ParseError::syntax(instr, i, "\"$\""));
                }
            }
            State::Dollar => {
                if is_alpha(c) {
                    name.push(c);
                    state = State::Name;
                } else {
                    return Err(ParseError::syntax(instr, i, "an operation name"));
                }
            }
            State::Name => {
                if is_alnum_underscore(c) {
                    name.push(c);
                } else if c == ':' {
                    state = State::Colon;
                } else {
                    return Err(ParseError::syntax(instr, i, "\":\""));
                }
            }
            State::Colon => {
                if c.is_whitespace() {
                    // ignore
                } else if is_alpha(c) {
                    optype.push(c);
                    state = State::Optype;
                } else {
                    return Err(ParseError::syntax(instr, i, "an operation type"));
                }
            }
            State::Optype => {
                if is_alnum_underscore(c) {
                    optype.push(c);
                } else if c == '(' {
                    state = State::Args;
                } else {
                    return Err(ParseError::syntax(instr, i, "an operation type"));
                }
            }
            State::Args => {
                if is_alpha(c) {
                    arg_name.push(c);
                    state = State::ArgsName;
                } else if c == ')' {
                    state = State::Finish;
                    break;
                } else {
                    return Err(ParseError::syntax(instr, i, "an argument name or \")\""));
                }
            }
            State::ArgsName => {
                if is_alnum_underscore(c) {
                    arg_name.push(c);
                } else if c == '=' {
                    state = State::ArgsEqual;
                } else {
                    return Err(ParseError::syntax(instr, i, "\"=\""));
                }
            }
            State::ArgsEqual => {
                if c == '$' {
                    state = State::ArgsDollar;
                } else if is_digit(c) {
                    arg_float.push(c);
                    state = State::ArgsFloat;
                } else {
                    return Err(ParseError::syntax(instr, i, "\"$\" or a literal value"));
                }
            }
            State::ArgsDollar => {
                if is_alpha(c) {
                    arg_target.push(c);
                    state = State::ArgsTarget;
                } else {
                    return Err(ParseError::syntax(instr, i, "an operation name"));
                }
            }
            State::ArgsTarget => {
                if is_alnum_underscore(c) {
                    arg_target.push(c);
                } else if c == '.' {
                    state = State::ArgsDot;
                } else {
                    return Err(ParseError::syntax(instr, i, "\".\""));
                }
            }
            State::ArgsDot => {
                if is_alpha(c) {
                    arg_attr.push(c);
                    state = State::ArgsAttr;
                } else {
                    return Err(ParseError::syntax(instr, i, "an attribute name"));
                }
            }
            State::ArgsAttr => {
                if is_alnum_underscore(c) {
                    arg_attr.push(c);
                } else if c == ',' {
                    args.push(Arg::Reference {
                        name: std::mem::take(&mut arg_name),
                        target: std::mem::take(&mut arg_target),
                        output: std::mem::take(&mut arg_attr),
                    });
                    state = State::ArgsComma;
                } else if c == ')' {
                    args.push(Arg::Reference {
                        name: std::mem::take(&mut arg_name),
                        target: std::mem::take(&mut arg_target),
                        output: std::mem::take(&mut arg_attr),
                    });
                    state = State::Finish;
                    break;
                } else {
                    return Err(ParseError::syntax(instr, i, "\",\" or \")\""));
                }
            }
            State::ArgsComma => {
                if c.is_whitespace() {
                    // ignore
                } else if is_alpha(c) {
                    arg_name.push(c);
                    state = State::ArgsName;
                } else {
                    return Err(ParseError::syntax(instr, i, "an argument name"));
                }
            }
            State::ArgsFloat => {
                if is_digit(c) {
                    arg_float.push(c);
                } else if c == '.' {
                    arg_float.push(c);
                    state = State::FloatDot;
                } else if c == ',' {
                    args.push(Arg::Literal {
                        name: std::mem::take(&mut arg_name),
                        value: parse_float(instr, i, &arg_float)?,
                    });
                    arg_float.clear();
                    state = State::ArgsComma;
                } else if c == ')' {
                    args.push(Arg::Literal {
                        name: std::mem::take(&mut arg_name),
                        value: parse_float(instr, i, &arg_float)?,
                    });
                    arg_float.clear();
                    state = State::Finish;
                    break;
                } else {
                    return Err(ParseError::syntax(
                        instr,
                        i,
                        "a digit, \".\", \",\" or \")\"",
                    ));
                }
            }
            State::FloatDot => {
                if is_digit(c) {
                    arg_float.push(c);
                    state = State::FloatDecimal;
                } else {
                    return Err(ParseError::syntax(instr, i, "a digit"));
                }
            }
            State::FloatDecimal => {
                if is_digit(c) {
                    arg_float.push(c);
                } else if c == ',' {
                    args.push(Arg::Literal {
                        name: std::mem::take(&mut arg_name),
                        value: parse_float(instr, i, &arg_float)?,
                    });
                    arg_float.clear();
                    state = State::ArgsComma;
                } else if c == ')' {
                    args.push(Arg::Literal {
                        name: std::mem::take(&mut arg_name),
                        value: parse_float(instr, i, &arg_float)?,
                    });
                    arg_float.clear();
                    state = State::Finish;
                    break;
                } else {
                    return Err(ParseError::syntax(instr, i, "a digit, \",\" or \")\""));
                }
            }
            State::Finish => {
                // unreachable: the loop always breaks as soon as this
                // state is entered.
                return Err(ParseError::UndefinedState(format!("{state:?}")));
            }
        }
    }

    if state != State::Finish {
        return Err(ParseError::syntax(instr, instr.chars().count(), "\")\""));
    }

    Ok((optype, name, args))
}

fn parse_float(instr: &str, column: usize, digits: &str) -> Result<f64, ParseError> {
    digits
        .parse::<f64>()
        .map_err(|_| ParseError::syntax(instr, column, "a well-formed number"))
}
