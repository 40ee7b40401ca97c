use super::*;

fn extreme(js: &str) -> String {
    minify(js, CompressionLevel::Extreme)
}

/// `(input, must contain, must not contain)`
const ASI_FIXTURES: &[(&str, &[&str], &[&str])] = &[
    ("x=1\nconst y=2", &["1;const"], &["1const"]),
    ("if(x){a()}\nelse{b()}", &["}else{"], &["};else{"]),
    ("do{a()}\nwhile(x)", &["}while("], &["};while("]),
    ("doSomething()\nconst r=1", &[");const"], &[")const"]),
    (
        "const btn=document.getElementById('btn')\nbtn.onclick=async()=>{console.log('x')}",
        &[");btn"],
        &[")btn"],
    ),
    ("tag`tmpl`\nconst a=1", &[";const"], &["` const"]),
    ("`x${1+2}`\nlet b=2", &[";let"], &["` let"]),
    ("(a ?? b)\nconst c=3", &[");const"], &[")const"]),
    ("await something()\nexport default foo", &[");export default"], &[")export default"]),
    ("await Promise.resolve()\nclass C{}", &[");class"], &[")class"]),
    ("function f(){return\n(function(){})()}", &["return;(function"], &["return (function"]),
    ("doSomething()\nnew Date()", &[");new"], &[")new"]),
    ("function* g(){x()\nyield 1}", &[");yield"], &[")yield"]),
    ("{let a=1}\nexport default a", &["};export default"], &["}export default"]),
    ("if(x){a()}\nelse if(y){b()}", &["}else if("], &["};if("]),
    ("try{a()}\ncatch{b()}", &["}catch{"], &["};catch{"]),
    ("let a=1\n(function(){return a})()", &["1;(function"], &["1(function"]),
    (
        "const n=0\n(async function(){await Promise.resolve(n)})()",
        &["0;(async function"],
        &["0(async function"],
    ),
    ("(function(){console.log('iife')})()\nconst x=1", &[");const"], &[")const"]),
    ("doSomething()\nclass X{}", &[");class"], &[")class"]),
    ("fn()\nfunction g(){}", &[");function"], &[")function"]),
    ("[1,2,3]\nconst z=3", &["];const"], &["]const"]),
    ("{let a=1}\nexport const q=1", &["};export"], &["}export"]),
    ("await fetch('/api')\nconst data=1", &[");const"], &[") const"]),
    ("fetch('/a').then(r=>r.json())\nconst k=0", &[");const"], &[")const"]),
    (
        "try{a()}\ncatch(e){b()}\nfinally{c()}",
        &["}catch(", "}finally{"],
        &["};catch(", "};finally{"],
    ),
    ("console.log(`hi ${1+2}`)\nconst z=0", &[");const"], &[")const"]),
    ("/ab+c/i.test(str)\nconst x=1", &[");const"], &[")const"]),
    ("obj?.method()?.prop\nconst y=2", &["prop;const"], &["prop const"]),
    ("import('x').then(m=>m.x())\nconst k=5", &[");const"], &[")const"]),
    ("for(const a of [1,2]){console.log(a)}\nconst n=9", &["};const"], &["}const"]),
    (
        "async function r(){for await (const a of xs){await a()}}\nconst n=10",
        &["};const"],
        &["}const"],
    ),
    ("let a=()=>{}\nconst b=1", &["};const"], &["}const"]),
    ("const arr=[1,2,3]\nlog(arr.length)", &["];log"], &["]log"]),
];

#[test]
fn test_asi_fixture_table() {
    for level in [CompressionLevel::Aggressive, CompressionLevel::Extreme] {
        for (input, contains, absent) in ASI_FIXTURES {
            let out = minify(input, level);
            for needle in *contains {
                assert!(
                    out.contains(needle),
                    "{input:?} at {level}: expected {needle:?} in {out:?}"
                );
            }
            for needle in *absent {
                assert!(
                    !out.contains(needle),
                    "{input:?} at {level}: unexpected {needle:?} in {out:?}"
                );
            }
        }
    }
}

#[test]
fn test_regex_and_division_on_one_line() {
    let out = extreme("a/b+c/i.test(str)\nconst x=1");
    assert_eq!(out, "a/b+c/i.test(str);const x=1");
}

#[test]
fn test_regex_with_spaces_is_untouched() {
    let out = extreme("const re = / a  b /g\nre.test(s)");
    assert_eq!(out, "const re=/ a  b /g;re.test(s)");
}

#[test]
fn test_string_literal_integrity() {
    let js = "const msg = \"const x = 1\"\nlet t = `a\n  if (b) {\n}`\nlog(msg, 'return\n')";
    let out = extreme(js);
    assert!(out.contains("\"const x = 1\""));
    assert!(out.contains("`a\n  if (b) {\n}`"));
    assert!(out.contains("'return\n'"));
    assert!(!out.contains("\"const x = 1;\""));
}

#[test]
fn test_template_interpolation_kept_whole() {
    let js = "const s = `${ items.map(i => `<li>${ i }</li>`).join(\"\") }`";
    let out = extreme(js);
    assert!(out.ends_with("`${ items.map(i => `<li>${ i }</li>`).join(\"\") }`"));
}

#[test]
fn test_comments_stripped() {
    let out = extreme("var x = 1; // comment\nvar y = 2; /* block */");
    assert_eq!(out, "var x=1;var y=2;");
}

#[test]
fn test_basic_keeps_lines_and_license() {
    let js = "/*! (c) vendor */\n  var x = 1;   // note\n\n\n  var y = 2;\n";
    let out = minify(js, CompressionLevel::Basic);
    assert_eq!(out, "/*! (c) vendor */\nvar x=1;\nvar y=2;");
}

#[test]
fn test_aggressive_drops_license() {
    let out = minify("/*! (c) vendor */\nvar x = 1", CompressionLevel::Aggressive);
    assert_eq!(out, "var x=1");
}

#[test]
fn test_keywords_keep_separating_space() {
    let out = extreme("let x = 1;\nlet y = 2;");
    assert_eq!(out, "let x=1;let y=2;");
    assert_eq!(extreme("return  typeof   a"), "return typeof a");
}

#[test]
fn test_operator_spacing() {
    assert_eq!(extreme("a - -b"), "a- -b");
    assert_eq!(extreme("a + ++b"), "a+ ++b");
    assert_eq!(extreme("a++ + b"), "a++ +b");
    assert_eq!(extreme("1 .toString()"), "1 .toString()");
    assert_eq!(extreme("x = /a/ in y"), "x=/a/ in y");
}

#[test]
fn test_control_head_gets_no_semicolon() {
    assert_eq!(extreme("if (a)\n  b()\nc()"), "if(a)b();c()");
    assert_eq!(extreme("while (x)\n  step()"), "while(x)step()");
}

#[test]
fn test_postfix_then_identifier() {
    assert_eq!(extreme("i++\nj--\nfoo()"), "i++;j--;foo()");
    assert_eq!(extreme("x\n++y"), "x;++y");
}

#[test]
fn test_member_continuation_across_lines() {
    assert_eq!(
        extreme("promise\n  .then(a)\n  .catch(b)"),
        "promise.then(a).catch(b)"
    );
    assert_eq!(extreme("const o = {\n  a: 1,\n  b: 2\n}"), "const o={a:1,b:2}");
}

#[test]
fn test_unterminated_comment_returns_original() {
    let js = "var a = 1;\n/* never closed\nvar b = 2;";
    assert!(matches!(
        try_minify(js, CompressionLevel::Extreme),
        Err(MinifyError::UnterminatedComment { offset: 11 })
    ));
    assert_eq!(extreme(js), js);
}

#[test]
fn test_none_and_empty_pass_through() {
    assert_eq!(minify("var  a = 1", CompressionLevel::None), "var  a = 1");
    assert_eq!(extreme("   \n  "), "   \n  ");
}

#[test]
fn test_asi_context_counts_insertions() {
    let js = "a()\nb()\nc()";
    let segments = lexer::lex(js);
    let mut emitter = Emitter::new(js, CompressionLevel::Extreme);
    for segment in segments {
        if let Segment::Code { range } = segment {
            emitter.code(range);
        }
    }
    assert_eq!(emitter.ctx.inserted(), 2);
    assert_eq!(emitter.finish().unwrap(), "a();b();c()");
}

#[test]
fn test_division_after_postfix_keeps_next_line() {
    assert_eq!(extreme("x = a++ / 2 // half\ny = 3"), "x=a++/2;y=3");
    assert_eq!(extreme("n = i-- / 2\nm = 1"), "n=i--/2;m=1");
}

#[test]
fn test_slash_after_regex_does_not_open_comment() {
    assert_eq!(extreme("x = /a/ / 2"), "x=/a/ /2");
    assert_eq!(extreme("x = /a/ * 2"), "x=/a/ *2");
    assert_eq!(extreme("x = a / /b/.source.length"), "x=a/ /b/.source.length");
}

#[test]
fn test_yield_ends_at_line_break() {
    assert_eq!(extreme("function* g(){yield\nfoo()}"), "function*g(){yield;foo()}");
    assert_eq!(extreme("function* g(){yield 1\n}"), "function*g(){yield 1}");
}

#[test]
fn test_literals_are_checked_against_source() {
    let js = "s = 'a  b'";
    let mut emitter = Emitter::new(js, CompressionLevel::Extreme);
    emitter.code(0..4);
    emitter.literal(4..10, LiteralKind::String);
    assert_eq!(emitter.ctx.literals, vec![(4..10, 2)]);
    emitter.out = emitter.out.replace("a  b", "a b");
    assert!(matches!(
        emitter.finish(),
        Err(MinifyError::LiteralMismatch { offset: 4 })
    ));

    let mut emitter = Emitter::new(js, CompressionLevel::Extreme);
    emitter.code(0..4);
    emitter.literal(4..10, LiteralKind::String);
    assert_eq!(emitter.finish().unwrap(), "s='a  b'");
}
