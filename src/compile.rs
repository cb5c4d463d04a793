//! Formula compiler
//!
//! Formulas are compiled with an operator-precedence (shunting-yard) scan.
//! Every argument of a function call is its own shunting-yard pass with its
//! own operator stack; the call's `,` separators and closing `)` are told
//! apart from bracketed sub-expressions by tracking bracket depth within
//! the argument.

use std::collections::HashMap;

use crate::error::FormulaError;
use crate::ident::Identifier;
use crate::lex::{self, Signature, Token};
use crate::namespace::SymbolTable;
use crate::op::{self, Operator, LEFT_BRACKET, NEGATIVE};
use crate::program::{Instruction, Program};

/// A successfully compiled formula
#[derive(Debug)]
pub(crate) struct Compiled {
    pub program: Program,
    /// Functions the program invokes, in call order
    pub callees: Vec<Identifier>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum End {
    Input,
    Separator,
    Close,
}

struct Outcome {
    end: End,
    empty: bool,
}

pub(crate) struct Compiler<'a> {
    table: &'a SymbolTable,
    signature: &'a Signature,
    slots: HashMap<&'a str, usize>,
    tokens: Vec<Token<'a>>,
    position: usize,
    max_nesting: usize,
    program: Program,
    callees: Vec<Identifier>,
}

impl<'a> Compiler<'a> {
    /// Set up a compiler over normalized formula text
    pub fn new(table: &'a SymbolTable, signature: &'a Signature, formula: &'a str) -> Self {
        let slots = signature
            .parameters()
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        Self {
            table,
            signature,
            slots,
            tokens: lex::tokenize(formula),
            position: 0,
            max_nesting: table.options().max_nesting,
            program: Program::new(),
            callees: Vec::new(),
        }
    }

    pub fn compile(mut self) -> Result<Compiled, FormulaError> {
        self.expression(0)?;
        Ok(Compiled {
            program: self.program,
            callees: self.callees,
        })
    }

    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.position).copied();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.position).copied()
    }

    fn emit(&mut self, instruction: Instruction) {
        self.program.append(instruction);
    }

    /// Compile one expression, up to the end of input or, inside a call,
    /// up to the `,` or `)` that ends the current argument.
    fn expression(&mut self, depth: usize) -> Result<Outcome, FormulaError> {
        let in_call = depth > 0;
        let mut operators: Vec<&'static Operator> = Vec::new();
        let mut brackets = 0usize;
        let mut expect_operand = true;
        let mut after_negative = false;
        let mut seen = false;

        let end = loop {
            let token = match self.next() {
                Some(token) => token,
                None => break End::Input,
            };
            let follows_negative = after_negative;
            after_negative = false;
            match token {
                Token::Word(word) => {
                    if !expect_operand {
                        return Err(FormulaError::InvalidOperatorSequence(word.into()));
                    }
                    if self.peek() == Some(Token::Symbol('(')) {
                        self.position += 1;
                        self.call(word, depth + 1)?;
                    } else {
                        self.operand(word)?;
                    }
                    expect_operand = false;
                }
                Token::Symbol('(') => {
                    if !expect_operand {
                        return Err(FormulaError::InvalidOperatorSequence("(".into()));
                    }
                    operators.push(&LEFT_BRACKET);
                    brackets += 1;
                }
                Token::Symbol(')') => {
                    if brackets == 0 {
                        if in_call {
                            break End::Close;
                        }
                        return Err(FormulaError::UnpairedBrackets);
                    }
                    if expect_operand {
                        return Err(FormulaError::InvalidOperatorSequence(")".into()));
                    }
                    while let Some(top) = operators.pop() {
                        if top.is_bracket() {
                            break;
                        }
                        self.emit(Instruction::Operator(top));
                    }
                    brackets -= 1;
                }
                Token::Symbol(',') => {
                    if in_call && brackets == 0 {
                        break End::Separator;
                    }
                    return Err(FormulaError::StraySeparator);
                }
                Token::Symbol('-') if expect_operand => {
                    if follows_negative {
                        return Err(FormulaError::RepeatedNegative);
                    }
                    // Prefix operators wait for their operand; nothing unwinds.
                    operators.push(&NEGATIVE);
                    after_negative = true;
                }
                Token::Symbol(symbol) => {
                    let operator = op::binary(symbol)
                        .ok_or_else(|| FormulaError::InvalidOperatorSequence(symbol.to_string()))?;
                    if expect_operand {
                        return Err(FormulaError::InvalidOperatorSequence(symbol.to_string()));
                    }
                    while let Some(&top) = operators.last() {
                        if top.is_bracket() || top.precedence() < operator.precedence() {
                            break;
                        }
                        self.emit(Instruction::Operator(top));
                        operators.pop();
                    }
                    operators.push(operator);
                    expect_operand = true;
                }
            }
            seen = true;
        };

        if in_call && end == End::Input {
            return Err(FormulaError::UnpairedBrackets);
        }
        if brackets != 0 {
            return Err(FormulaError::UnpairedBrackets);
        }
        if seen && expect_operand {
            return Err(FormulaError::InvalidOperatorSequence(
                "end of expression".into(),
            ));
        }
        while let Some(top) = operators.pop() {
            self.emit(Instruction::Operator(top));
        }

        Ok(Outcome { end, empty: !seen })
    }

    /// Resolve a run that is not a call: a number or a bound parameter
    fn operand(&mut self, word: &str) -> Result<(), FormulaError> {
        if let Some(value) = lex::parse_number(word) {
            self.emit(Instruction::Constant(value));
            return Ok(());
        }
        match self.slots.get(word) {
            Some(index) => {
                let index = *index;
                self.emit(Instruction::Parameter(index));
                Ok(())
            }
            None => Err(FormulaError::UndefinedVariable(word.into())),
        }
    }

    /// Compile the argument list of a call to `name`, whose `(` has been
    /// consumed, then emit the invocation.
    fn call(&mut self, name: &str, depth: usize) -> Result<(), FormulaError> {
        if depth > self.max_nesting {
            return Err(FormulaError::NestingTooDeep(self.max_nesting));
        }

        let mut arity = 0usize;
        loop {
            let outcome = self.expression(depth)?;
            if outcome.empty {
                if arity == 0 && outcome.end == End::Close {
                    break;
                }
                return Err(FormulaError::EmptyArgument(name.into()));
            }
            arity += 1;
            if outcome.end == End::Close {
                break;
            }
        }

        let identifier = Identifier::new(name, arity);
        if &identifier == self.signature.identifier() {
            return Err(FormulaError::RecursiveReference(identifier));
        }
        let callee = match self.table.resolve(&identifier) {
            Some(callee) => callee.clone(),
            None => {
                return Err(FormulaError::UndefinedFunction {
                    name: name.into(),
                    arity,
                })
            }
        };
        self.emit(Instruction::Invoke { callee, arity });
        self.callees.push(identifier);
        Ok(())
    }
}

#[cfg(test)]
mod test_compiler {
    use super::*;
    use crate::func::Definition;
    use crate::namespace::NamespaceOptions;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn table() -> SymbolTable {
        let mut table = SymbolTable::new(NamespaceOptions::default());
        table
            .register(Arc::new(Definition::native("neg", 1, |args| -args[0])))
            .unwrap();
        table
            .register(Arc::new(Definition::native("hyp", 2, |args| {
                args[0].hypot(args[1])
            })))
            .unwrap();
        table
            .register(Arc::new(Definition::native("one", 0, |_| 1.0)))
            .unwrap();
        table
    }

    fn compile(table: &SymbolTable, ident: &str, formula: &str) -> Result<Compiled, FormulaError> {
        let signature = Signature::parse(ident, 16)?;
        let formula = lex::strip_spaces(formula)?;
        lex::count_bracket_pairs(&formula)?;
        Compiler::new(table, &signature, &formula).compile()
    }

    fn render(table: &SymbolTable, ident: &str, formula: &str) -> String {
        compile(table, ident, formula).unwrap().program.to_string()
    }

    fn postfix_cases() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("f(a,b,c)", "(a+b)^c", "$0 $1 + $2 ^"),
            ("f(a,b,c)", "a+b*c", "$0 $1 $2 * +"),
            ("f(a,b,c)", "a-b-c", "$0 $1 - $2 -"),
            ("f(a,b,c)", "a^b^c", "$0 $1 ^ $2 ^"),
            ("f(a,b)", "a%b*2", "$0 $1 % 2 *"),
            ("f(a)", "-a", "$0 neg"),
            ("f(a)", "-a^2", "$0 2 ^ neg"),
            ("f(a)", "-a*2", "$0 neg 2 *"),
            ("f(a)", "2^-a", "2 $0 neg ^"),
            ("f(a,b)", "a*-b", "$0 $1 neg *"),
            ("f(a)", "-(-a)", "$0 neg neg"),
            ("f(a,b)", "a - -b", "$0 $1 neg -"),
            ("f(a)", "((a))", "$0"),
            ("f(x)", "3.5", "3.5"),
            ("f(x)", "", ""),
            ("f(x)", "neg(x)", "$0 [neg/1]"),
            ("f(x,y)", "hyp(x, y) * 2", "$0 $1 [hyp/2] 2 *"),
            ("f(x,y)", "hyp((x+1)*2, neg(y))", "$0 1 + 2 * $1 [neg/1] [hyp/2]"),
            ("f(x,y)", "hyp(hyp(x,y),(y))", "$0 $1 [hyp/2] $1 [hyp/2]"),
            ("f(x)", "one()+x", "[one/0] $0 +"),
            ("f()", "one()", "[one/0]"),
        ]
    }

    #[test]
    fn test_postfix_output() {
        let table = table();
        postfix_cases()
            .into_iter()
            .for_each(|(ident, formula, exp)| {
                println!("{} = {}", ident, formula);
                assert_eq!(render(&table, ident, formula), exp);
            })
    }

    #[test]
    fn test_callees_are_recorded() {
        let table = table();
        let compiled = compile(&table, "f(x,y)", "hyp(neg(x), y) + neg(y)").unwrap();
        assert_eq!(
            compiled.callees,
            vec![
                Identifier::new("neg", 1),
                Identifier::new("hyp", 2),
                Identifier::new("neg", 1),
            ]
        );
    }

    fn error_cases() -> Vec<(&'static str, &'static str, FormulaError)> {
        vec![
            ("f(a)", "a+z", FormulaError::UndefinedVariable("z".into())),
            ("f(a)", "1x", FormulaError::UndefinedVariable("1x".into())),
            (
                "f(a)",
                "nope(a)",
                FormulaError::UndefinedFunction {
                    name: "nope".into(),
                    arity: 1,
                },
            ),
            (
                "f(a)",
                "hyp(a)",
                FormulaError::UndefinedFunction {
                    name: "hyp".into(),
                    arity: 1,
                },
            ),
            ("f(a)", "--a", FormulaError::RepeatedNegative),
            ("f(a)", "a,a", FormulaError::StraySeparator),
            ("f(a)", "(a,a)", FormulaError::StraySeparator),
            ("f(a,b)", "hyp((a,b))", FormulaError::StraySeparator),
            ("f(a)", "hyp(a,)", FormulaError::EmptyArgument("hyp".into())),
            ("f(a)", "hyp(,a)", FormulaError::EmptyArgument("hyp".into())),
            (
                "f(a)",
                "*a",
                FormulaError::InvalidOperatorSequence("*".into()),
            ),
            (
                "f(a)",
                "a+*a",
                FormulaError::InvalidOperatorSequence("*".into()),
            ),
            (
                "f(a)",
                "a+",
                FormulaError::InvalidOperatorSequence("end of expression".into()),
            ),
            (
                "f(a)",
                "()",
                FormulaError::InvalidOperatorSequence(")".into()),
            ),
            (
                "f(a)",
                "(a)a",
                FormulaError::InvalidOperatorSequence("a".into()),
            ),
            (
                "f(a)",
                "a(a)",
                FormulaError::UndefinedFunction {
                    name: "a".into(),
                    arity: 1,
                },
            ),
            (
                "f(a)",
                "f(a)",
                FormulaError::RecursiveReference(Identifier::new("f", 1)),
            ),
        ]
    }

    #[test]
    fn test_compile_errors() {
        let table = table();
        error_cases()
            .into_iter()
            .for_each(|(ident, formula, exp)| {
                println!("{} = {}", ident, formula);
                assert_eq!(compile(&table, ident, formula).unwrap_err(), exp);
            })
    }

    #[test]
    fn test_nesting_limit() {
        let options = NamespaceOptions {
            max_nesting: 2,
            ..NamespaceOptions::default()
        };
        let mut table = SymbolTable::new(options);
        table
            .register(Arc::new(Definition::native("neg", 1, |args| -args[0])))
            .unwrap();
        assert!(compile(&table, "f(a)", "neg(neg(a))").is_ok());
        assert_eq!(
            compile(&table, "f(a)", "neg(neg(neg(a)))").unwrap_err(),
            FormulaError::NestingTooDeep(2)
        );
    }
}
