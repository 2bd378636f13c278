//! Terminal values and repeat counts, read from their meta-grammar nodes.

use crate::abnf::error::{Error, GrammarError};
use crate::abnf::parsing::{Literal, Repeat};
use crate::abnf::tree::Node;

/// `"text"`, `%i"text"` or `%s"text"`.
pub(super) fn char_val(node: &Node) -> Result<Literal, Error> {
    let form = node.children().first().ok_or_else(|| malformed("char-val", node))?;
    let quoted = form
        .child("quoted-string")
        .ok_or_else(|| malformed("char-val", form))?
        .value();
    let text = quoted
        .strip_prefix('"')
        .and_then(|quoted| quoted.strip_suffix('"'))
        .ok_or_else(|| malformed("char-val", form))?;
    Ok(Literal::with_case(text, form.is_named("case-sensitive-string")))
}

/// `%b`, `%d` or `%x` followed by a value, a dotted concatenation or a range.
pub(super) fn num_val(node: &Node) -> Result<Literal, Error> {
    let value = node
        .children()
        .iter()
        .find(|child| child.as_rule().is_some())
        .ok_or_else(|| malformed("num-val", node))?;
    let radix = match value.name() {
        "bin-val" => 2,
        "dec-val" => 10,
        "hex-val" => 16,
        _ => return Err(malformed("num-val", value)),
    };

    let text = value.value();
    // skip the b/d/x marker
    let digits = text.get(1..).unwrap_or_default();
    if let Some((first, last)) = digits.split_once('-') {
        return Ok(Literal::range(decode(first, radix)?, decode(last, radix)?));
    }
    let text = digits
        .split('.')
        .map(|code| decode(code, radix))
        .collect::<Result<String, _>>()?;
    Ok(Literal::case_sensitive(text))
}

fn decode(digits: &str, radix: u32) -> Result<char, GrammarError> {
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| GrammarError::InvalidNumVal(digits.to_string()))
}

/// `n`, `n*`, `*m`, `n*m` or `*`.
pub(super) fn repeat(text: &str) -> Result<Repeat, GrammarError> {
    let bound = |digits: &str| -> Result<Option<usize>, GrammarError> {
        if digits.is_empty() {
            return Ok(None);
        }
        digits
            .parse()
            .map(Some)
            .map_err(|_| GrammarError::InvalidRepeat(text.to_string()))
    };

    let repeat = match text.split_once('*') {
        Some((min, max)) => Repeat::new(bound(min)?.unwrap_or(0), bound(max)?),
        None => Repeat::exactly(bound(text)?.unwrap_or(0)),
    };
    if repeat.max.is_some_and(|max| max < repeat.min) {
        return Err(GrammarError::InvalidRepeat(text.to_string()));
    }
    Ok(repeat)
}

fn malformed(context: &'static str, node: &Node) -> Error {
    GrammarError::UnexpectedNode {
        context,
        found: node.name().to_string(),
    }
    .into()
}
