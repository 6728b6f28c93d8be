//! TypeScript emission for a parsed action body.

use std::collections::HashSet;

use xtuml_core::grammar::{navigation_hops, Cardinality};
use xtuml_core::source::is_identifier;

use super::ast::Stmt;
use super::expr::lower_expr;
use super::LoweringContext;
use crate::error::LoweringError;
use crate::naming;

/// Spaces per nesting level.
const STEP: usize = 2;

pub(crate) fn emit(stmts: &[Stmt], ctx: &LoweringContext<'_>) -> Result<String, LoweringError> {
    let mut emitter = Emitter {
        ctx,
        out: String::new(),
        declared: HashSet::new(),
    };
    emitter.block(stmts, 0)?;
    Ok(emitter.out)
}

struct Emitter<'c, 'm> {
    ctx: &'c LoweringContext<'m>,
    out: String,
    /// Locals declared so far; later assignments to them stay bare.
    declared: HashSet<String>,
}

impl Emitter<'_, '_> {
    fn line(&mut self, depth: usize, text: &str) {
        let width = self.ctx.indent + depth * STEP;
        self.out.extend(std::iter::repeat(' ').take(width));
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn expr(&self, text: &str) -> Result<String, LoweringError> {
        lower_expr(text, self.ctx)
    }

    /// `let ` on the first declaration of `var`.
    fn declare(&mut self, var: &str) -> &'static str {
        if self.declared.insert(var.to_string()) {
            "let "
        } else {
            ""
        }
    }

    fn block(&mut self, stmts: &[Stmt], depth: usize) -> Result<(), LoweringError> {
        for stmt in stmts {
            self.stmt(stmt, depth)?;
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &Stmt, depth: usize) -> Result<(), LoweringError> {
        match stmt {
            Stmt::Comment(text) if text.is_empty() => self.line(depth, "//"),
            Stmt::Comment(text) => self.line(depth, &format!("// {text}")),
            Stmt::Create { var, class } => {
                let Some(class) = self.ctx.class(class) else {
                    return Err(LoweringError::UnknownClass {
                        name: class.clone(),
                    });
                };
                let let_kw = self.declare(var);
                self.line(depth, &format!("{let_kw}{var} = {{}} as {};", class.name));
            }
            Stmt::Select {
                cardinality,
                var,
                navigation,
                condition,
            } => {
                let value = self.navigation(navigation, *cardinality, condition.as_deref())?;
                let let_kw = self.declare(var);
                self.line(depth, &format!("{let_kw}{var} = {value};"));
            }
            Stmt::Delete { var } => {
                let target = self.expr(var)?;
                self.line(depth, &format!("// delete {var}"));
                self.line(depth, "{");
                self.line(
                    depth + 1,
                    &format!(
                        "const registry = ({target}.constructor as unknown as {{ instances?: unknown[] }}).instances ?? [];"
                    ),
                );
                self.line(depth + 1, &format!("const idx = registry.indexOf({target});"));
                self.line(depth + 1, "if (idx !== -1) registry.splice(idx, 1);");
                self.line(depth, "}");
            }
            Stmt::Relate { from, to, label } => {
                let from = self.expr(from)?;
                let to = self.expr(to)?;
                self.line(depth, &format!("{from}.relateAcross{label}({to}); // {label}"));
            }
            Stmt::Assign { target, value } => {
                let value = self.expr(value)?;
                let line = if is_identifier(target) && target != "self" {
                    let let_kw = self.declare(target);
                    format!("{let_kw}{target} = {value};")
                } else {
                    format!("{} = {value};", self.expr(target)?)
                };
                self.line(depth, &line);
            }
            Stmt::Expr(text) => {
                let text = self.expr(text)?;
                self.line(depth, &format!("{text};"));
            }
            Stmt::If {
                branches,
                otherwise,
            } => {
                for (idx, (condition, body)) in branches.iter().enumerate() {
                    let condition = self.expr(condition)?;
                    if idx == 0 {
                        self.line(depth, &format!("if ({condition}) {{"));
                    } else {
                        self.line(depth, &format!("}} else if ({condition}) {{"));
                    }
                    self.block(body, depth + 1)?;
                }
                if let Some(body) = otherwise {
                    self.line(depth, "} else {");
                    self.block(body, depth + 1)?;
                }
                self.line(depth, "}");
            }
            Stmt::ForEach {
                var,
                collection,
                body,
            } => {
                let collection = if collection.contains("->") {
                    self.navigation(collection, Cardinality::Many, None)?
                } else {
                    self.expr(collection)?
                };
                self.declared.insert(var.clone());
                self.line(depth, &format!("for (const {var} of {collection}) {{"));
                self.block(body, depth + 1)?;
                self.line(depth, "}");
            }
        }
        Ok(())
    }

    /// Accessor chain for `start->A[R1]->B[R2]`. Intermediate hops use the
    /// single-instance accessor; the last hop follows the cardinality.
    fn navigation(
        &self,
        navigation: &str,
        cardinality: Cardinality,
        condition: Option<&str>,
    ) -> Result<String, LoweringError> {
        let (start, hops) = navigation_hops(navigation);
        let mut value = self.expr(start)?;
        let last = hops.len().saturating_sub(1);
        for (idx, hop) in hops.iter().enumerate() {
            let Some(class) = self.ctx.class(hop.target) else {
                return Err(LoweringError::UnknownClass {
                    name: hop.target.to_string(),
                });
            };
            let list = idx == last && (cardinality != Cardinality::One || condition.is_some());
            value.push_str(&format!(".{}()", naming::accessor(&class.name, list)));
        }

        match (cardinality, condition) {
            (Cardinality::Many, Some(condition)) => {
                let condition = self.expr(condition)?;
                value.push_str(&format!(".filter(selected => {condition})"));
            }
            (Cardinality::One | Cardinality::Any, Some(condition)) => {
                let condition = self.expr(condition)?;
                value.push_str(&format!(".find(selected => {condition})"));
            }
            (Cardinality::Any, None) => value.push_str("[0]"),
            _ => {}
        }
        Ok(value)
    }
}
