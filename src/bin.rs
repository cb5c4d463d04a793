use std::io;
use std::io::Read;

use anyhow::{Context, Result};
use clap::{App, Arg};
use serde::Serialize;
use serde_json;

use mathfunc_rs::{Function, Namespace};

#[derive(Serialize)]
struct Output<'a> {
    function: &'a str,
    result: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    postfix: Option<String>,
}

fn configure_args<'a, 'b>(app: App<'a, 'b>) -> App<'a, 'b> {
    app.version(env!("CARGO_PKG_VERSION"))
        .author("Matthew Planchard <msplanchard@gmail.com>")
        .about(
            "Compile a formula and evaluate it.\n\
            \n\
            When no <arguments> or <arguments> is -, read them from stdin.\n\
            \n\
            The result is written to stdout as JSON. NaN results are \n\
            written as null.",
        )
        .arg(
            Arg::with_name("identifier")
                .help("The function identifier, e.g. 'f(a, b)'")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("formula")
                .help("The formula, e.g. '(a + b) ^ 2'")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("arguments")
                .help("A JSON array of numbers. May be provided as stdin.")
                .required(false)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("define")
                .help("A helper definition 'name(params)=formula', compiled first")
                .short("d")
                .long("define")
                .multiple(true)
                .number_of_values(1)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("postfix")
                .help("Include the compiled postfix program in the output")
                .long("postfix"),
        )
        .after_help(
            r#"EXAMPLES:
    mathfunc 'f(a, b, c)' '(a + b) ^ c' '[1, 2, 0.03]'
    mathfunc -d 'f(a, b, c)=(a + b) ^ c' 'g(x, y, z)' 'log(f(x, y, z) - 1)' '[1, 2, 0.03]'
    echo '[0.5]' | mathfunc 'h(x)' 'sin(x) ^ 2 + cos(x) ^ 2'"#,
        )
}

fn main() -> Result<()> {
    let app = configure_args(App::new("mathfunc"));
    let matches = app.get_matches();

    // Helpers must outlive the target, since it may invoke them.
    let mut helpers = Vec::new();
    for definition in matches.values_of("define").into_iter().flatten() {
        let split = definition
            .find('=')
            .with_context(|| format!("Definition '{}' has no '='", definition))?;
        let (ident, formula) = (&definition[..split], &definition[split + 1..]);
        let helper = Function::new_in(&Namespace::global(), ident, formula)
            .with_context(|| format!("Could not compile definition '{}'", definition))?;
        helpers.push(helper);
    }

    let ident = matches
        .value_of("identifier")
        .context("identifier arg expected")?;
    let formula = matches.value_of("formula").context("formula arg expected")?;
    let function = Function::new(ident, formula).context("Could not compile formula")?;

    let arguments_arg = matches.value_of("arguments").unwrap_or("-");

    let mut arguments: String;
    if arguments_arg != "-" {
        arguments = arguments_arg.to_string();
    } else {
        arguments = String::new();
        io::stdin().lock().read_to_string(&mut arguments)?;
    }
    let values: Vec<f64> = serde_json::from_str(&arguments)
        .context("Could not parse arguments as a JSON array of numbers")?;

    let result = function
        .invoke(&values)
        .context("Could not evaluate formula")?;

    let output = Output {
        function: function.expression(),
        result,
        postfix: match matches.is_present("postfix") {
            true => function.program().map(|program| program.to_string()),
            false => None,
        },
    };
    println!("{}", serde_json::to_string(&output)?);

    Ok(())
}
