pub const SAMPLE_CONFIG_YAML: &str = r#"# caserun configuration
version: 1
name: sample

# Each case names the inputs to apply and, optionally, the outputs to
# capture after execution. Without `capture`, every output the target
# reports is recorded. Cases without an id get `case-N`.
#
# The builtin echo target reflects each input back as an identically
# named output; point `capture` at your real target's output names when
# running with `caserun run -- <program> [args...]`.
cases:
  - id: c1
    inputs:
      x: 1
    capture: [x]
  - id: c2
    inputs:
      x: 2
      note: "two"
"#;
