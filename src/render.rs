//! Post-processing of model answers for display.
//!
//! Models answer in a mix of prose and LaTeX. [`latex_to_text`] flattens the
//! LaTeX into readable text, then [`Renderer`] turns caret exponents into
//! superscripts.

use crate::config::ExponentStyle;
use regex::{Captures, Regex};

/// Renders model output with a fixed exponent style.
pub struct Renderer {
    style: ExponentStyle,
    exponent_regex: Regex,
}

impl Renderer {
    pub fn new(style: ExponentStyle) -> Self {
        // base^exp, where exp is a braced group or a signed run of word chars
        let exponent_regex =
            Regex::new(r"(?P<base>(?:\w|\)|\]))\^(?P<exp>\{[^}]+\}|-?[\w()+\-]+)")
                .expect("Invalid regex");

        Self {
            style,
            exponent_regex,
        }
    }

    pub fn style(&self) -> ExponentStyle {
        self.style
    }

    /// Flatten LaTeX and render exponents.
    pub fn render(&self, text: &str) -> String {
        self.render_exponents(&latex_to_text(text))
    }

    /// Render `base^exp` occurrences in the configured style.
    ///
    /// Unicode rendering is conservative: an exponent is converted only if
    /// every character has a superscript form, otherwise it is left as is.
    pub fn render_exponents(&self, text: &str) -> String {
        self.exponent_regex
            .replace_all(text, |caps: &Captures| {
                let base = &caps["base"];
                let exp = strip_braces(&caps["exp"]);
                match self.style {
                    ExponentStyle::Html => format!("{}<sup>{}</sup>", base, exp),
                    ExponentStyle::Unicode => match to_superscript(exp) {
                        Some(sup) => format!("{}{}", base, sup),
                        None => caps[0].to_string(),
                    },
                }
            })
            .into_owned()
    }
}

fn strip_braces(exp: &str) -> &str {
    exp.strip_prefix('{')
        .and_then(|e| e.strip_suffix('}'))
        .unwrap_or(exp)
}

fn to_superscript(exp: &str) -> Option<String> {
    exp.chars()
        .map(|c| {
            Some(match c {
                '0' => '⁰',
                '1' => '¹',
                '2' => '²',
                '3' => '³',
                '4' => '⁴',
                '5' => '⁵',
                '6' => '⁶',
                '7' => '⁷',
                '8' => '⁸',
                '9' => '⁹',
                '+' => '⁺',
                '-' => '⁻',
                '(' => '⁽',
                ')' => '⁾',
                'n' => 'ⁿ',
                'i' => 'ⁱ',
                _ => return None,
            })
        })
        .collect()
}

/// Convert LaTeX markup to plain text.
///
/// Math delimiters are removed, fractions become `a/b`, roots become `√(x)`,
/// text-style wrappers are unwrapped and common symbols map to Unicode.
/// Braced exponent groups are kept so [`Renderer`] can see their extent.
pub fn latex_to_text(input: &str) -> String {
    let mut parser = Parser {
        chars: input.chars().collect(),
        pos: 0,
    };
    parser.convert_until(None)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Convert until the closing delimiter (consumed) or end of input.
    fn convert_until(&mut self, close: Option<char>) -> String {
        let mut out = String::new();

        while let Some(c) = self.next() {
            match c {
                _ if Some(c) == close => break,
                '$' => {}
                '{' => out.push_str(&self.convert_until(Some('}'))),
                '}' => {}
                '^' if self.peek() == Some('{') => {
                    self.pos += 1;
                    let inner = self.convert_until(Some('}'));
                    out.push_str("^{");
                    out.push_str(&inner);
                    out.push('}');
                }
                '\\' => self.convert_escape(&mut out),
                _ => out.push(c),
            }
        }

        out
    }

    fn convert_escape(&mut self, out: &mut String) {
        let Some(c) = self.peek() else {
            return;
        };

        if !c.is_ascii_alphabetic() {
            self.pos += 1;
            match c {
                '(' | ')' | '[' | ']' | '!' => {}
                '\\' => out.push('\n'),
                ',' | ';' | ':' | ' ' => out.push(' '),
                _ => out.push(c),
            }
            return;
        }

        let mut name = String::new();
        while let Some(c) = self.peek().filter(|c| c.is_ascii_alphabetic()) {
            name.push(c);
            self.pos += 1;
        }

        match name.as_str() {
            "frac" | "dfrac" | "tfrac" => {
                let numerator = self.argument();
                let denominator = self.argument();
                out.push_str(&format!(
                    "{}/{}",
                    group(&numerator),
                    group(&denominator)
                ));
            }
            "sqrt" => {
                let index = self.optional_argument();
                let radicand = self.argument();
                if let Some(index) = index {
                    out.push_str(&index);
                }
                out.push_str(&format!("√({})", radicand));
            }
            "text" | "textrm" | "textbf" | "textit" | "mathrm" | "mathbf" | "mathit"
            | "boxed" | "operatorname" | "emph" | "mbox" => {
                let body = self.argument();
                out.push_str(&body);
            }
            "left" | "right" => {
                self.skip_spaces();
                if self.peek() == Some('.') {
                    self.pos += 1;
                }
            }
            "quad" | "qquad" | "enspace" | "thinspace" => out.push(' '),
            "displaystyle" | "limits" | "nolimits" => {}
            other => {
                if let Some(symbol) = symbol(other) {
                    out.push_str(symbol);
                } else if is_named_function(other) {
                    out.push_str(other);
                }
                // Unknown macros are dropped; a following brace group is kept
                // as plain content by the main loop.
            }
        }
    }

    fn skip_spaces(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// A braced group, or a single token when there are no braces.
    fn argument(&mut self) -> String {
        self.skip_spaces();
        match self.next() {
            Some('{') => self.convert_until(Some('}')),
            Some('\\') => {
                let mut out = String::new();
                self.convert_escape(&mut out);
                out
            }
            Some(c) => c.to_string(),
            None => String::new(),
        }
    }

    fn optional_argument(&mut self) -> Option<String> {
        self.skip_spaces();
        if self.peek() != Some('[') {
            return None;
        }
        self.pos += 1;
        Some(self.convert_until(Some(']')))
    }
}

/// Parenthesize compound fraction operands.
fn group(operand: &str) -> String {
    let operand = operand.trim();
    let compound = operand.chars().count() > 1
        && operand.chars().any(|c| matches!(c, ' ' | '+' | '-' | '*' | '/' | '×' | '·'));
    if compound {
        format!("({})", operand)
    } else {
        operand.to_string()
    }
}

fn is_named_function(name: &str) -> bool {
    matches!(
        name,
        "sin" | "cos" | "tan" | "cot" | "sec" | "csc" | "arcsin" | "arccos" | "arctan" | "sinh"
            | "cosh" | "tanh" | "log" | "ln" | "exp" | "lim" | "min" | "max" | "det" | "gcd"
            | "mod" | "deg"
    )
}

fn symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "times" => "×",
        "cdot" => "·",
        "div" => "÷",
        "pm" => "±",
        "mp" => "∓",
        "le" | "leq" => "≤",
        "ge" | "geq" => "≥",
        "ne" | "neq" => "≠",
        "approx" => "≈",
        "equiv" => "≡",
        "sim" => "∼",
        "propto" => "∝",
        "infty" => "∞",
        "pi" => "π",
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" | "varepsilon" => "ε",
        "theta" => "θ",
        "lambda" => "λ",
        "mu" => "μ",
        "sigma" => "σ",
        "phi" | "varphi" => "φ",
        "omega" => "ω",
        "Delta" => "Δ",
        "Sigma" => "Σ",
        "Omega" => "Ω",
        "sum" => "∑",
        "prod" => "∏",
        "int" => "∫",
        "partial" => "∂",
        "nabla" => "∇",
        "circ" | "degree" => "°",
        "angle" => "∠",
        "triangle" => "△",
        "perp" => "⊥",
        "parallel" => "∥",
        "in" => "∈",
        "notin" => "∉",
        "subset" => "⊂",
        "subseteq" => "⊆",
        "cup" => "∪",
        "cap" => "∩",
        "emptyset" => "∅",
        "forall" => "∀",
        "exists" => "∃",
        "to" | "rightarrow" => "→",
        "leftarrow" => "←",
        "Rightarrow" | "implies" => "⇒",
        "Leftrightarrow" | "iff" => "⇔",
        "therefore" => "∴",
        "because" => "∵",
        "ldots" | "cdots" | "dots" => "…",
        "lbrace" => "{",
        "rbrace" => "}",
        "vert" | "mid" => "|",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latex_delimiters_and_fractions() {
        assert_eq!(latex_to_text(r"\(\frac{1}{2}\)"), "1/2");
        assert_eq!(latex_to_text(r"$\frac{a+b}{2}$"), "(a+b)/2");
        assert_eq!(latex_to_text(r"\[ x = \dfrac{3}{4} \]"), " x = 3/4 ");
    }

    #[test]
    fn test_latex_roots_wrappers_and_symbols() {
        assert_eq!(latex_to_text(r"\sqrt{2}"), "√(2)");
        assert_eq!(latex_to_text(r"\sqrt[3]{8}"), "3√(8)");
        assert_eq!(latex_to_text(r"\boxed{42}"), "42");
        assert_eq!(latex_to_text(r"\text{Area} = \pi r"), "Area = π r");
        assert_eq!(latex_to_text(r"3 \times 4 \le 12"), "3 × 4 ≤ 12");
        assert_eq!(latex_to_text(r"\left( x \right)"), "( x )");
        assert_eq!(latex_to_text(r"\sin x"), "sin x");
    }

    #[test]
    fn test_latex_keeps_braced_exponents() {
        assert_eq!(latex_to_text(r"$x^{n+1}$"), "x^{n+1}");
        assert_eq!(latex_to_text(r"$e^{\pi}$"), "e^{π}");
    }

    #[test]
    fn test_plain_text_unchanged() {
        let text = "The answer is (3) 784.\nFinal: 784";
        assert_eq!(latex_to_text(text), text);
    }

    #[test]
    fn test_unicode_exponents() {
        let renderer = Renderer::new(ExponentStyle::Unicode);
        assert_eq!(renderer.render_exponents("x^2 + y^{n+1}"), "x² + yⁿ⁺¹");
        assert_eq!(renderer.render_exponents("y^-3"), "y⁻³");
        assert_eq!(renderer.render_exponents("(a+b)^2"), "(a+b)²");
        // 'k' has no superscript form
        assert_eq!(renderer.render_exponents("x^{k}"), "x^{k}");
    }

    #[test]
    fn test_html_exponents() {
        let renderer = Renderer::new(ExponentStyle::Html);
        assert_eq!(renderer.render_exponents("x^3"), "x<sup>3</sup>");
        assert_eq!(renderer.render_exponents("f(x)^{k+1}"), "f(x)<sup>k+1</sup>");
    }

    #[test]
    fn test_render_full_pipeline() {
        let renderer = Renderer::new(ExponentStyle::Unicode);
        assert_eq!(
            renderer.render(r"The area is \(\pi r^2\) and \(\frac{d}{dx} x^3 = 3x^2\)."),
            "The area is π r² and d/dx x³ = 3x²."
        );
    }
}
