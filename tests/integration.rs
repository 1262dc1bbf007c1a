//! End-to-end checks of whole models

use dimcheck::config::{Config, OutputFormat};
use dimcheck::{TypeRegistry, analyze, typecheck};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const NEURON: &str = r#"
# leaky integrate-and-fire parameters
C_m      pF   = 250 pF             [[ C_m > 0 pF ]]
tau_m    ms   = 10 ms              [[ tau_m > 0 ms ]]
g_L      nS   = C_m / tau_m
E_L      mV   = -70 mV
V_th     mV   = -55 mV             [[ V_th > E_L ]]
I_e      pA   = 0 pA
t_ref    ms   = 2 ms; n_spikes integer = 0
decay    1/ms = 1 / tau_m
decay2   1/ms**2 = decay ** 2
label    string = "iaf_psc"
"#;

#[test]
fn test_neuron_model_checks_cleanly() {
    let registry = TypeRegistry::new();
    let (model, checked, reporter) = analyze("neuron.dim", NEURON, &registry).unwrap();

    assert_eq!(reporter.error_messages(), Vec::<String>::new());
    assert_eq!(reporter.warning_messages(), Vec::<String>::new());
    assert_eq!(model.declarations.len(), 11);

    let pretty: Vec<(String, String)> = checked
        .declarations
        .iter()
        .map(|(name, ty)| (name.clone(), ty.as_ref().unwrap().pretty_print()))
        .collect();
    assert_eq!(pretty[2], ("g_L".to_string(), "e-12*(s**3 * A**2) / (m**2 * g)".to_string()));
    assert_eq!(pretty[9], ("decay2".to_string(), "e6*1 / s**2".to_string()));
}

#[test]
fn test_expression_types_are_recorded() {
    let registry = TypeRegistry::new();
    let (model, checked, _) = analyze("neuron.dim", NEURON, &registry).unwrap();

    let g_l = &model.declarations[2];
    let init = g_l.init.as_ref().unwrap();
    let ty = checked.expr_type(init).unwrap().as_ref().unwrap();
    let declared = checked.declared_type("g_L").unwrap().as_ref().unwrap();
    assert!(Arc::ptr_eq(ty, declared));

    // every sub-expression got an entry
    let mut count = 0;
    init.walk(&mut |e| {
        assert!(checked.expr_type(e).is_some());
        count += 1;
    });
    assert_eq!(count, 3);
}

#[test]
fn test_mixed_errors_and_warnings() {
    let source = "\
tau ms = 1 s
V mV = 3 ms
x real = V ** y
y integer = 2
z boolean = 1.5 [[ z ]]
tau ms
w parsec
";
    let registry = TypeRegistry::new();
    let (_, checked, reporter) = analyze("bad.dim", source, &registry).unwrap();

    assert_eq!(
        reporter.warning_messages(),
        vec!["implicit magnitude conversion from `s` to `e-3*s` (factor 1e3)".to_string()]
    );
    assert_eq!(
        reporter.error_messages(),
        vec![
            "duplicate declaration of `tau`".to_string(),
            "unit `parsec` is not recognized".to_string(),
            "exponent is not a compile-time constant".to_string(),
            "type mismatch in declaration of `V`: expected `(m**2 * g) / (s**3 * A)`, found `e-3*s`"
                .to_string(),
            "type mismatch in declaration of `z`: expected `boolean`, found `real`".to_string(),
        ]
    );
    assert!(checked.declared_type("w").unwrap().is_err());
}

#[test]
fn test_unit_overflow_is_a_diagnostic() {
    let registry = TypeRegistry::new();
    let source = "x real = e2000000000 * e2000000000\ny e2000000000 * e2000000000";
    let (_, checked, reporter) = analyze("overflow.dim", source, &registry).unwrap();

    let message = "unit exponent overflow in `e2000000000*1` * `e2000000000*1`".to_string();
    assert_eq!(reporter.error_messages(), vec![message.clone(), message]);
    assert!(checked.declared_type("x").unwrap().is_ok());
    assert!(checked.declared_type("y").unwrap().is_err());
}

#[test]
fn test_predefined_names_and_unit_suffixes() {
    let registry = TypeRegistry::new();
    let source = "flag boolean\nx boolean = 10 flag\ny real = e ** 1.5\nnow ms = t [[ now >= 0 ms ]]";
    let (_, _, reporter) = analyze("names.dim", source, &registry).unwrap();

    assert_eq!(
        reporter.error_messages(),
        vec!["unit `flag` is not recognized".to_string()]
    );
    assert_eq!(reporter.warning_messages(), Vec::<String>::new());
}

#[test]
fn test_typecheck_entry_point() {
    assert!(typecheck("a real = 1\nb integer = a").is_err());
    let checked = typecheck("a real = 1\nb real = a * 2").unwrap();
    assert!(checked.declared_type("b").unwrap().as_ref().unwrap().is_real());
}

#[test]
fn test_syntax_errors_are_not_diagnostics() {
    let registry = TypeRegistry::new();
    assert!(analyze("bad.dim", "x real = (1", &registry).is_err());
    assert!(analyze("bad.dim", "x real = 1 @", &registry).is_err());
}

#[test]
fn test_global_registry_is_shared_across_threads() {
    let handles: Vec<_> = (0..8)
        .map(|_| {
            std::thread::spawn(|| {
                let (_, checked, _) =
                    analyze("t.dim", "a mol/cd**3 = 1 mol / cd**3", TypeRegistry::global())
                        .unwrap();
                checked.declared_type("a").unwrap().clone().unwrap()
            })
        })
        .collect();

    let types: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(types.iter().all(|t| Arc::ptr_eq(t, &types[0])));
}

#[test]
fn test_config_discovered_beside_input() {
    let dir = std::env::temp_dir().join(format!("dimcheck-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("dimcheck.toml"),
        "[check]\ndeny_warnings = true\n[output]\nformat = \"json\"\n",
    )
    .unwrap();

    let config = Config::discover(&dir.join("model.dim")).unwrap();
    assert!(config.check.deny_warnings);
    assert_eq!(config.output.format, OutputFormat::Json);

    std::fs::remove_dir_all(&dir).unwrap();
}
