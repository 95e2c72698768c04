use mochascript::{lex, run_source, run_source_with, Environment, Error, InterpreterOptions, Scalar};
use pretty_assertions::assert_eq;

fn run(source: &str) -> (Result<Option<i32>, Error>, String) {
    let mut env = Environment::new();
    let mut out = Vec::new();
    let result = run_source(source, &mut env, &mut out);
    (result, String::from_utf8(out).unwrap())
}

fn output_of(source: &str) -> String {
    let (result, output) = run(source);
    assert_eq!(result, Ok(None), "program failed: {}", source);
    output
}

#[test]
fn precedence() {
    assert_eq!(output_of("write(2+3*4);"), "14");
    assert_eq!(output_of("write((2+3)*4);"), "20");
    assert_eq!(output_of("write(2^3^2);"), "512");
    assert_eq!(output_of("write(10 - 4 - 3);"), "3");
}

#[test]
fn comparisons_yield_one_or_zero() {
    assert_eq!(output_of("write(4>2); write(4==4);"), "11");
    assert_eq!(output_of("write(4<2); write(4!=4); write(3>=3); write(2<=1);"), "0010");
}

#[test]
fn mixed_declarations_and_output() {
    let source = r#"
        def x = 4;
        mut y = 2;
        write(x + y * 3);
        write(" ");
        write(x > y);
        write(" ");
        write(x == 4);
    "#;
    assert_eq!(output_of(source), "10 1 1");
}

#[test]
fn write_and_writeln() {
    assert_eq!(output_of(r#"write("X"); writeln("Y");"#), "XY\n");
    assert_eq!(output_of(r#"writeln(1 + 1); writeln("done");"#), "2\ndone\n");
}

#[test]
fn string_escapes_reach_output() {
    assert_eq!(output_of(r#"writeln("say \"hi\"\tnow");"#), "say \"hi\"\tnow\n");
}

#[test]
fn if_elif_else_picks_one_branch() {
    let source = r#"if 0>1 { write("a"); } elif 1==1 { write("b"); } else { write("c"); }"#;
    assert_eq!(output_of(source), "b");

    let source = r#"if 0 { write("a"); } elif 0 { write("b"); } else { write("c"); }"#;
    assert_eq!(output_of(source), "c");

    let source = r#"if 1 { write("a"); } elif 1 { write("b"); }"#;
    assert_eq!(output_of(source), "a");
}

#[test]
fn for_loop_terminates() {
    assert_eq!(output_of("for (def mut i = 0; i < 3; i = i + 1) { write(i); }"), "012");
}

#[test]
fn nested_loops() {
    let source = r#"
        def mut total = 0;
        for (def mut i = 0; i < 3; i = i + 1) {
            for (mut j = 0; j < 2; j = j + 1) {
                total = total + 1;
            }
            j = 0;
        }
        write(total);
    "#;
    // Without block scoping the inner init runs once per outer iteration and
    // redeclares `j` in the same scope
    let (result, _) = run(source);
    assert_eq!(result, Err(Error::DuplicateDeclaration { name: "j".into() }));

    let source = r#"
        def mut total = 0;
        def mut j = 0;
        for (def mut i = 0; i < 3; i = i + 1) {
            for (j = 0; j < 2; j = j + 1) {
                total = total + 1;
            }
        }
        write(total);
    "#;
    assert_eq!(output_of(source), "6");
}

#[test]
fn top_level_return_sets_exit_code() {
    let (result, output) = run(r#"write("before"); ret 7; write("after");"#);
    assert_eq!(result, Ok(Some(7)));
    assert_eq!(output, "before");
}

#[test]
fn nested_return_sets_exit_code() {
    let source = r#"
        for (def mut i = 0; i < 100; i = i + 1) {
            if i == 4 {
                ret i + 38;
            }
        }
        write("unreachable");
    "#;
    let (result, output) = run(source);
    assert_eq!(result, Ok(Some(42)));
    assert_eq!(output, "");
}

#[test]
fn non_numeric_return_is_zero() {
    assert_eq!(run(r#"def s = "text"; ret s;"#).0, Ok(Some(0)));
}

#[test]
fn comments_never_change_behaviour() {
    let plain = "def mut a = 1; if a { a = a + 1; } for (def mut i = 0; i < 2; i = i + 1) { write(i); } write(a);";
    let commented = "
        @ leading
        def mut a = 1; @ trailing
        if a { @ first in block
            a = a + 1;
            @ last in block
        }
        @ between
        for (def mut i = 0; i < 2; i = i + 1) { @ loop body
            write(i);
        }
        write(a);
        @ final
    ";

    let mut env_plain = Environment::new();
    let mut out_plain = Vec::new();
    run_source(plain, &mut env_plain, &mut out_plain).unwrap();

    let mut env_commented = Environment::new();
    let mut out_commented = Vec::new();
    run_source(commented, &mut env_commented, &mut out_commented).unwrap();

    assert_eq!(out_plain, out_commented);
    assert_eq!(String::from_utf8(out_plain).unwrap(), "012");
    assert_eq!(env_plain.variables(), env_commented.variables());
}

#[test]
fn environment_persists_across_runs() {
    // What a REPL does: one environment, many inputs
    let mut env = Environment::new();
    let mut out = Vec::new();
    run_source("def mut n = 1;", &mut env, &mut out).unwrap();
    run_source("n = n * 10;", &mut env, &mut out).unwrap();
    assert_eq!(
        run_source("def n = 2;", &mut env, &mut out),
        Err(Error::DuplicateDeclaration { name: "n".into() })
    );
    run_source("write(n);", &mut env, &mut out).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "10");
    assert_eq!(env.get_var("n").unwrap().value, Scalar::from(10.0));
    assert_eq!(env.depth(), 1);
}

#[test]
fn failed_statement_keeps_earlier_output() {
    let (result, output) = run("write(1); write(missing); write(2);");
    assert_eq!(result, Err(Error::UndefinedVariable { name: "missing".into() }));
    assert_eq!(output, "1");
}

#[test]
fn immutability() {
    let (result, _) = run("def k = 1; k = 2;");
    assert_eq!(result, Err(Error::ImmutableAssignment { name: "k".into() }));
    assert_eq!(output_of("def mut k = 1; k = 2; write(k);"), "2");
}

#[test]
fn assignment_requires_declaration() {
    let (result, _) = run("ghost = 1;");
    assert_eq!(result, Err(Error::UndeclaredAssignment { name: "ghost".into() }));
}

#[test]
fn branch_declarations_leak_by_default() {
    let source = r#"
        if 1 { def inside = "visible"; }
        for (def mut i = 0; i < 3; i = i + 1) { }
        write(inside); write(" "); write(i);
    "#;
    assert_eq!(output_of(source), "visible 3");
}

#[test]
fn block_scope_option_confines_branch_declarations() {
    let options = InterpreterOptions { block_scope: true };
    let mut env = Environment::new();
    let mut out = Vec::new();

    let result = run_source_with(
        r#"def mut hits = 0; for (def mut i = 0; i < 3; i = i + 1) { def step = i; hits = hits + step; }"#,
        &mut env,
        &mut out,
        options,
    );
    assert_eq!(result, Ok(None));
    assert_eq!(env.get_var("hits").unwrap().value, Scalar::from(3.0));
    assert!(!env.has_var("i"));
    assert!(!env.has_var("step"));

    let result = run_source_with(r#"if 1 { def inside = 1; } write(inside);"#, &mut env, &mut out, options);
    assert_eq!(result, Err(Error::UndefinedVariable { name: "inside".into() }));
    assert_eq!(env.depth(), 1);
}

#[test]
fn lex_errors_carry_position() {
    let (result, _) = run("def a = 1;\nwrite(a ! 2);");
    match result {
        Err(Error::UnexpectedCharacter { ch, span }) => {
            assert_eq!(ch, '!');
            assert_eq!((span.line, span.column), (2, 9));
        }
        other => panic!("unexpected result: {:?}", other),
    }

    assert!(matches!(run(r#"write("open);"#).0, Err(Error::UnterminatedString { .. })));
}

#[test]
fn parse_errors_run_nothing() {
    let (result, output) = run(r#"write("ok"); def = 3;"#);
    assert!(matches!(result, Err(Error::ExpectedToken { .. })));
    assert_eq!(output, "");
}

#[test]
fn tokenization_is_deterministic() {
    let source = r#"for (def mut i = 0; i <= 9; i = i + 1) { if i % 2 == 0 { writeln("even"); } } @ end"#;
    assert_eq!(lex(source).unwrap(), lex(source).unwrap());
}
