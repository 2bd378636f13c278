//! ABNF written in ABNF (RFC 5234 section 4, char-val from RFC 7405).

use super::Builder;
use crate::abnf::parsing::Parser;

pub(super) fn define(b: &Builder<'_>) {
    let c_wsp = || b.rule("c-wsp");

    b.define(
        "rulelist",
        b.some(b.alt(vec![
            b.rule("rule"),
            b.cat(vec![b.any(c_wsp()), b.rule("c-nl")]),
        ])),
    );
    b.define(
        "rule",
        b.cat(vec![
            b.rule("rulename"),
            b.rule("defined-as"),
            b.rule("elements"),
            b.rule("c-nl"),
        ]),
    );
    b.define(
        "rulename",
        b.cat(vec![
            b.rule("ALPHA"),
            b.any(b.alt(vec![b.rule("ALPHA"), b.rule("DIGIT"), b.lit("-")])),
        ]),
    );
    b.define(
        "defined-as",
        b.cat(vec![
            b.any(c_wsp()),
            b.alt(vec![b.lit("=/"), b.lit("=")]),
            b.any(c_wsp()),
        ]),
    );
    b.define("elements", b.cat(vec![b.rule("alternation"), b.any(c_wsp())]));
    b.define(
        "c-wsp",
        b.alt(vec![b.rule("WSP"), b.cat(vec![b.rule("c-nl"), b.rule("WSP")])]),
    );
    b.define("c-nl", b.alt(vec![b.rule("comment"), b.rule("CRLF")]));
    b.define(
        "comment",
        b.cat(vec![
            b.lit(";"),
            b.any(b.alt(vec![b.rule("WSP"), b.rule("VCHAR")])),
            b.rule("CRLF"),
        ]),
    );
    b.define(
        "alternation",
        b.cat(vec![
            b.rule("concatenation"),
            b.any(b.cat(vec![
                b.any(c_wsp()),
                b.lit("/"),
                b.any(c_wsp()),
                b.rule("concatenation"),
            ])),
        ]),
    );
    b.define(
        "concatenation",
        b.cat(vec![
            b.rule("repetition"),
            b.any(b.cat(vec![b.some(c_wsp()), b.rule("repetition")])),
        ]),
    );
    b.define(
        "repetition",
        b.cat(vec![b.opt(b.rule("repeat")), b.rule("element")]),
    );
    b.define(
        "repeat",
        b.alt(vec![
            b.cat(vec![b.any(b.rule("DIGIT")), b.lit("*"), b.any(b.rule("DIGIT"))]),
            b.some(b.rule("DIGIT")),
        ]),
    );
    b.define(
        "element",
        b.alt(vec![
            b.rule("rulename"),
            b.rule("group"),
            b.rule("option"),
            b.rule("char-val"),
            b.rule("num-val"),
            b.rule("prose-val"),
        ]),
    );
    b.define("group", bracketed(b, "(", ")"));
    b.define("option", bracketed(b, "[", "]"));
    b.define(
        "num-val",
        b.cat(vec![
            b.lit("%"),
            b.alt(vec![b.rule("bin-val"), b.rule("dec-val"), b.rule("hex-val")]),
        ]),
    );
    b.define("bin-val", numeric(b, "b", "BIT"));
    b.define("dec-val", numeric(b, "d", "DIGIT"));
    b.define("hex-val", numeric(b, "x", "HEXDIG"));
    b.define(
        "prose-val",
        b.cat(vec![
            b.lit("<"),
            b.any(b.alt(vec![b.range('\x20', '\x3D'), b.range('\x3F', '\x7E')])),
            b.lit(">"),
        ]),
    );
    b.define(
        "char-val",
        b.alt(vec![
            b.rule("case-insensitive-string"),
            b.rule("case-sensitive-string"),
        ]),
    );
    b.define(
        "case-insensitive-string",
        b.cat(vec![b.opt(b.lit("%i")), b.rule("quoted-string")]),
    );
    b.define(
        "case-sensitive-string",
        b.cat(vec![b.lit("%s"), b.rule("quoted-string")]),
    );
    b.define(
        "quoted-string",
        b.cat(vec![
            b.rule("DQUOTE"),
            b.any(b.alt(vec![b.range('\x20', '\x21'), b.range('\x23', '\x7E')])),
            b.rule("DQUOTE"),
        ]),
    );
}

/// `open *c-wsp alternation *c-wsp close`
fn bracketed(b: &Builder<'_>, open: &str, close: &str) -> Parser {
    b.cat(vec![
        b.lit(open),
        b.any(b.rule("c-wsp")),
        b.rule("alternation"),
        b.any(b.rule("c-wsp")),
        b.lit(close),
    ])
}

/// `marker 1*digit [ 1*("." 1*digit) / ("-" 1*digit) ]`
fn numeric(b: &Builder<'_>, marker: &str, digit: &str) -> Parser {
    let digits = || b.some(b.rule(digit));
    b.cat(vec![
        b.lit(marker),
        b.cat(vec![
            digits(),
            b.opt(b.alt(vec![
                b.some(b.cat(vec![b.lit("."), digits()])),
                b.cat(vec![b.lit("-"), digits()]),
            ])),
        ]),
    ])
}
