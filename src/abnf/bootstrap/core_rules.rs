//! RFC 5234 appendix B.1.

use super::Builder;

pub(super) fn define(b: &Builder<'_>) {
    b.define(
        "ALPHA",
        b.alt(vec![b.range('\x41', '\x5A'), b.range('\x61', '\x7A')]),
    );
    b.define("BIT", b.alt(vec![b.lit("0"), b.lit("1")]));
    b.define("CHAR", b.range('\x01', '\x7F'));
    b.define(
        "CTL",
        b.alt(vec![b.range('\x00', '\x1F'), b.exact("\x7F")]),
    );
    b.define("CR", b.exact("\r"));
    b.define("CRLF", b.cat(vec![b.rule("CR"), b.rule("LF")]));
    b.define("DIGIT", b.range('\x30', '\x39'));
    b.define("DQUOTE", b.exact("\""));
    b.define(
        "HEXDIG",
        b.alt(vec![
            b.rule("DIGIT"),
            b.lit("A"),
            b.lit("B"),
            b.lit("C"),
            b.lit("D"),
            b.lit("E"),
            b.lit("F"),
        ]),
    );
    b.define("HTAB", b.exact("\t"));
    b.define("LF", b.exact("\n"));
    b.define(
        "LWSP",
        b.any(b.alt(vec![
            b.rule("WSP"),
            b.cat(vec![b.rule("CRLF"), b.rule("WSP")]),
        ])),
    );
    b.define("OCTET", b.range('\x00', '\u{FF}'));
    b.define("SP", b.exact(" "));
    b.define("VCHAR", b.range('\x21', '\x7E'));
    b.define("WSP", b.alt(vec![b.rule("SP"), b.rule("HTAB")]));
}
