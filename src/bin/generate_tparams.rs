//! Offline helper: prints the encoded `tParams` token for every named
//! error-injection scenario, as a JSON object suitable for pasting into the
//! test-harness configuration. Plays no runtime role.

fn main() {
    let tokens = oidc_probe::tparams::named_scenario_tokens()
        .into_iter()
        .map(|(key, token)| (key.to_string(), serde_json::Value::String(token)))
        .collect::<serde_json::Map<_, _>>();

    let rendered = serde_json::to_string_pretty(&serde_json::Value::Object(tokens))
        .expect("scenario table serializes");
    println!("{rendered}");
}
