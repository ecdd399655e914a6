/// Perl Extractor Implementation
///
/// A line scanner, not a parser: every clean line is split into statements and
/// each statement is offered to an ordered table of recognizer rules. The first
/// rule that matches handles the statement.
///
/// This module is organized into focused sub-modules:
/// - preprocess: comment/POD/heredoc stripping and string neutralization
/// - state: parse state shared by the rules
/// - variables: known constructors, lexicals, loop and conditional bindings
/// - packages: package/class/role declarations
/// - subs: subs, methods, method modifiers and signatures
/// - declarations: phasers, labels, constants and fields
/// - imports: imports, parents and autoload accessors
/// - routes: web framework routes and hooks
/// - extents: block end lines by brace counting
/// - helpers: compiled patterns and statement utilities
mod declarations;
pub(crate) mod extents;
pub(crate) mod helpers;
mod imports;
mod packages;
pub(crate) mod preprocess;
mod routes;
pub(crate) mod state;
mod subs;
mod variables;

use crate::config::NavigatorConfig;
use crate::extractors::base::{BaseExtractor, ParseMode, RecordOptions, SymbolKind, SymbolTable};
use helpers::{inline_body, split_statements, Statement};
use preprocess::{QuotedSpans, TypeAnnotation};
use regex::Regex;
use state::{Continuation, ParseState};

/// What a recognizer did with a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleOutcome {
    /// Not matched; try the next rule
    Skipped,
    Handled,
    /// Handled a declaration whose block may open on the same line
    OpensBlock,
}

type Rule = fn(&mut PerlExtractor, &Statement) -> RuleOutcome;

const OUTLINE_RULES: &[Rule] = &[
    packages::package_declaration,
    subs::sub_declaration,
    subs::outline_only_sub,
    declarations::phaser_or_label,
    declarations::constant,
    declarations::field,
    subs::method_modifier,
    imports::module_import,
    routes::web_route,
];

const SELF_NAVIGATION_RULES: &[Rule] = &[
    variables::known_constructor,
    variables::lexical_variables,
    variables::loop_variable,
    variables::conditional_binding,
    packages::package_declaration,
    subs::sub_declaration,
    declarations::phaser_or_label,
    declarations::constant,
    declarations::field,
    subs::method_modifier,
    imports::module_import,
    imports::autoload_accessor,
    routes::web_route,
];

const REFINEMENT_RULES: &[Rule] = &[packages::package_declaration, subs::sub_declaration];

fn rules_for(mode: ParseMode) -> &'static [Rule] {
    match mode {
        ParseMode::Outline => OUTLINE_RULES,
        ParseMode::SelfNavigation => SELF_NAVIGATION_RULES,
        ParseMode::Refinement => REFINEMENT_RULES,
    }
}

pub struct PerlExtractor {
    base: BaseExtractor,
    state: ParseState,
    annotations: Vec<TypeAnnotation>,
    quoted: Vec<QuotedSpans>,
}

impl PerlExtractor {
    pub fn new(uri: &str, content: &str, mode: ParseMode, config: NavigatorConfig) -> Self {
        let cleaned = preprocess::clean_code(content, mode);
        Self {
            base: BaseExtractor::new(uri, mode, cleaned.lines, config),
            state: ParseState::default(),
            annotations: cleaned.annotations,
            quoted: cleaned.quoted,
        }
    }

    /// Run every line through the rule table and return the finished table
    pub fn extract(mut self) -> SymbolTable {
        let rules = rules_for(self.base.mode);
        let mut annotations = std::mem::take(&mut self.annotations).into_iter().peekable();

        for line_number in 0..self.base.line_count() {
            self.base.line_number = line_number;
            while let Some(annotation) = annotations.next_if(|a| a.line == line_number) {
                self.register_annotation(annotation);
            }

            let line = self.base.line_text(line_number).to_string();
            if line.is_empty() {
                continue;
            }
            let quoted = self.quoted.get(line_number).cloned().unwrap_or_default();

            if self.state.continuation != Continuation::None {
                self.continue_declaration(&line, &quoted, rules);
                continue;
            }

            for statement in split_statements(&line, &quoted) {
                self.classify(&statement, rules);
            }
        }

        self.base.into_table()
    }

    /// Offer a statement to each rule in order. Text after the first `{` of a
    /// block-opening declaration is classified again as an inline statement.
    fn classify(&mut self, statement: &Statement, rules: &[Rule]) {
        for rule in rules {
            match rule(self, statement) {
                RuleOutcome::Skipped => continue,
                RuleOutcome::Handled => return,
                RuleOutcome::OpensBlock => {
                    if let Some(body) = inline_body(&statement.text) {
                        let inner = Statement {
                            text: body.to_string(),
                            terminated: statement.terminated,
                        };
                        self.classify(&inner, rules);
                    }
                    return;
                }
            }
        }
    }

    fn continue_declaration(&mut self, line: &str, quoted: &QuotedSpans, rules: &[Rule]) {
        match std::mem::take(&mut self.state.continuation) {
            Continuation::None => {}
            Continuation::Variables => variables::continue_variables(self, line),
            Continuation::Signature { name, index } => {
                let body = subs::continue_signature(self, line, quoted, name, index);
                for statement in body.unwrap_or_default() {
                    self.classify(&statement, rules);
                }
            }
            Continuation::ConstantBlock => {
                declarations::emit_constant_pairs(self, line);
                if !line.contains('}') {
                    self.state.continuation = Continuation::ConstantBlock;
                }
            }
        }
    }

    /// Record a declaration owned by the current package
    fn emit(&mut self, name: &str, kind: SymbolKind, options: RecordOptions) -> Option<usize> {
        tracing::trace!("{} {} at line {}", kind, name, self.base.line_number);
        let package = self.state.current_package.clone();
        self.base.create_record(name, kind, &package, options)
    }

    fn emit_local_vars(&mut self, names: &[String]) {
        for name in names {
            self.emit(name, SymbolKind::LocalVar, RecordOptions::default());
        }
    }

    fn register_annotation(&mut self, annotation: TypeAnnotation) {
        self.emit(
            &annotation.variable,
            SymbolKind::Canonical,
            RecordOptions {
                type_detail: Some(annotation.type_name),
                ..Default::default()
            },
        );
    }

    /// End line of the block opened on the current line, in modes that track extents
    fn block_end(&self, filter: Option<&Regex>) -> Option<usize> {
        self.base.mode.needs_extents().then(|| {
            extents::sub_end_line(&self.base.code_lines, self.base.line_number, filter)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::base::SymbolRecord;

    fn parse(text: &str, mode: ParseMode) -> SymbolTable {
        PerlExtractor::new("file:///test.pm", text, mode, NavigatorConfig::default()).extract()
    }

    fn kinds(table: &SymbolTable) -> Vec<(String, SymbolKind, usize)> {
        table
            .iter_records()
            .map(|r| (r.name.clone(), r.kind, r.line()))
            .collect()
    }

    fn only<'a>(table: &'a SymbolTable, name: &str) -> &'a SymbolRecord {
        let records = table.records(name);
        assert_eq!(records.len(), 1, "expected one record for {}", name);
        &records[0]
    }

    #[test]
    fn test_package_sub_and_inline_variable() {
        let table = parse(
            "package Foo;\nsub bar { my $x = 5; return $x; }\n",
            ParseMode::SelfNavigation,
        );
        assert_eq!(
            kinds(&table),
            vec![
                ("Foo".to_string(), SymbolKind::Package, 0),
                ("bar".to_string(), SymbolKind::LocalSub, 1),
                ("$x".to_string(), SymbolKind::LocalVar, 1),
            ]
        );
        assert_eq!(only(&table, "bar").package, "Foo");
    }

    #[test]
    fn test_known_constructor_sets_canonical_type() {
        let table = parse(
            "my $obj = Acme::Widget->new();\n$obj->spin();\n",
            ParseMode::SelfNavigation,
        );
        assert_eq!(table.canonical_type("$obj"), Some("Acme::Widget"));
        assert_eq!(only(&table, "$obj").type_detail, "Acme::Widget");
    }

    #[test]
    fn test_chained_constructor_is_not_a_known_type() {
        let table = parse(
            "my $res = Acme::Client->new(url => $u)->get('/');\nmy $w = new Acme::Widget;\n",
            ParseMode::SelfNavigation,
        );
        assert_eq!(only(&table, "$res").type_detail, "");
        assert_eq!(table.canonical_type("$res"), None);
        assert_eq!(table.canonical_type("$w"), Some("Acme::Widget"));
    }

    #[test]
    fn test_annotations_last_one_wins() {
        let table = parse(
            "my $x; # $x isa Alpha\nfoo();\n# $x isa Beta\n",
            ParseMode::SelfNavigation,
        );
        assert_eq!(table.canonical_type("$x"), Some("Beta"));
        assert_eq!(table.canonical_elems["$x"].line(), 2);
    }

    #[test]
    fn test_multi_line_variable_list_continues() {
        let table = parse("my ($first,\n    $second,\n    $third) = @_;\nmy $after;\n", ParseMode::SelfNavigation);
        assert_eq!(only(&table, "$first").line(), 0);
        assert_eq!(only(&table, "$second").line(), 1);
        assert_eq!(only(&table, "$third").line(), 2);
        assert_eq!(only(&table, "$after").line(), 3);
    }

    #[test]
    fn test_repeated_declarations_keep_source_order() {
        let table = parse("my $x = 1;\n\nmy $x = 2;\n", ParseMode::SelfNavigation);
        let lines: Vec<usize> = table.records("$x").iter().map(|r| r.line()).collect();
        assert_eq!(lines, vec![0, 2]);
    }

    #[test]
    fn test_loop_and_conditional_bindings() {
        let text = "OUTER: foreach my $item (@list) {\nif (my $found = lookup($item)) {\n} elsif (my ($k, $v) = each %h) {\n}\n}\ntry { run() } catch ($err) {\n}\n";
        let table = parse(text, ParseMode::SelfNavigation);
        assert_eq!(only(&table, "OUTER").kind, SymbolKind::Label);
        assert_eq!(only(&table, "$item").line(), 0);
        assert_eq!(only(&table, "$found").line(), 1);
        assert_eq!(only(&table, "$k").line(), 2);
        assert_eq!(only(&table, "$v").line(), 2);
        assert_eq!(only(&table, "$err").line(), 5);
    }

    #[test]
    fn test_signatures_from_parameter_list_and_lookahead() {
        let text = "sub explicit ($self, $name, %opts) {\n}\nsub unpacked {\n    my ($self, $arg) = @_;\n    my $extra = shift;\n}\nsub shifted {\n    my $self = shift;\n    my $n = $_[0];\n}\n";
        let table = parse(text, ParseMode::SelfNavigation);
        assert_eq!(
            only(&table, "explicit").signature,
            Some(vec!["$self".to_string(), "$name".to_string(), "%opts".to_string()])
        );
        assert_eq!(
            only(&table, "unpacked").signature,
            Some(vec!["$self".to_string(), "$arg".to_string(), "$extra".to_string()])
        );
        assert_eq!(
            only(&table, "shifted").signature,
            Some(vec!["$self".to_string(), "$n".to_string()])
        );
        // explicit parameters are also locals
        assert!(table.records("$name").iter().any(|r| r.line() == 0));
    }

    #[test]
    fn test_lookahead_stops_at_closing_brace() {
        let text = "sub first {\n    return 1;\n}\nsub second {\n    my ($self) = @_;\n}\n";
        let table = parse(text, ParseMode::SelfNavigation);
        assert_eq!(only(&table, "first").signature, Some(vec![]));
        assert_eq!(only(&table, "second").signature, Some(vec!["$self".to_string()]));
    }

    #[test]
    fn test_signature_spanning_lines() {
        let text = "sub long (\n    $alpha,\n    $beta\n) {\n    return;\n}\n";
        let table = parse(text, ParseMode::SelfNavigation);
        assert_eq!(
            only(&table, "long").signature,
            Some(vec!["$alpha".to_string(), "$beta".to_string()])
        );
    }

    #[test]
    fn test_method_keywords_and_attribute() {
        let text = "method area {\n}\nsub name :method {\n}\nmy sub helper {\n}\nasync sub fetch {\n}\nfunc gated ($x) {\n}\n";
        let table = parse(text, ParseMode::SelfNavigation);
        assert_eq!(only(&table, "area").kind, SymbolKind::LocalMethod);
        assert_eq!(only(&table, "name").kind, SymbolKind::LocalMethod);
        assert_eq!(only(&table, "helper").kind, SymbolKind::LocalSub);
        assert_eq!(only(&table, "fetch").kind, SymbolKind::LocalSub);
        assert!(table.records("gated").is_empty());

        let gated = parse(
            "use Function::Parameters;\nfun greet ($who) {\n}\n",
            ParseMode::SelfNavigation,
        );
        assert_eq!(only(&gated, "greet").signature, Some(vec!["$who".to_string()]));
    }

    #[test]
    fn test_phasers_labels_and_constants() {
        let text = "BEGIN {\n}\nRETRY:\nuse constant PI => 3.14;\nuse constant {\n    E => 2.71,\n    NAME => 'x',\n};\nReadonly my $MAX => 10;\n";
        let table = parse(text, ParseMode::SelfNavigation);
        assert_eq!(only(&table, "BEGIN").kind, SymbolKind::Phaser);
        assert_eq!(only(&table, "RETRY").kind, SymbolKind::Label);
        assert_eq!(only(&table, "PI").value, "3.14");
        assert_eq!(only(&table, "E").value, "2.71");
        assert_eq!(only(&table, "NAME").value, "'x'");
        assert_eq!(only(&table, "NAME").line(), 6);
        assert_eq!(only(&table, "$MAX").value, "10");
        assert!(!table.imported.contains_key("constant"));
    }

    #[test]
    fn test_moose_attributes_are_gated_on_import() {
        let ungated = parse("package Foo;\nhas name => (is => 'ro');\n", ParseMode::SelfNavigation);
        assert!(ungated.records("name").is_empty());

        let text = "package Foo;\nuse Moose;\nhas name => (is => 'ro');\nhas [qw(width height)] => (is => 'rw');\n";
        let table = parse(text, ParseMode::SelfNavigation);
        assert_eq!(only(&table, "name").kind, SymbolKind::Field);
        assert_eq!(only(&table, "Foo::name").kind, SymbolKind::PathedField);
        assert_eq!(only(&table, "height").line(), 3);
        assert_eq!(only(&table, "Foo::width").kind, SymbolKind::PathedField);
        assert_eq!(table.imported.get("Moose"), Some(&1));
    }

    #[test]
    fn test_object_pad_fields() {
        let text = "use Object::Pad;\nclass Point :isa(Shape) {\n    field $x :param = 0;\n    has $y;\n}\n";
        let table = parse(text, ParseMode::SelfNavigation);
        assert_eq!(only(&table, "Point").kind, SymbolKind::Class);
        assert_eq!(table.parents.get("Point").map(String::as_str), Some("Shape"));
        assert_eq!(only(&table, "$x").kind, SymbolKind::Field);
        assert_eq!(only(&table, "Point::x").kind, SymbolKind::PathedField);
        assert_eq!(only(&table, "$y").kind, SymbolKind::Field);
    }

    #[test]
    fn test_parents_from_pragmas_extends_and_isa() {
        let text = "package A;\nuse parent -norequire, 'Base::A';\npackage B;\nuse Moo;\nextends 'Base::B';\npackage C;\nour @ISA = ('Base::C');\npackage D;\nuse base qw(Base::D Other);\n";
        let table = parse(text, ParseMode::SelfNavigation);
        let parent = |child: &str| table.parents.get(child).map(String::as_str);
        assert_eq!(parent("A"), Some("Base::A"));
        assert_eq!(parent("B"), Some("Base::B"));
        assert_eq!(parent("C"), Some("Base::C"));
        assert_eq!(parent("D"), Some("Base::D"));
    }

    #[test]
    fn test_self_binding_is_a_plain_local() {
        let text = "package Shop::Cart;\nsub add {\n    my $self = shift;\n}\npackage Shop::Item;\nsub price {\n    my ($self, $currency) = @_;\n}\n";
        let table = parse(text, ParseMode::SelfNavigation);
        assert_eq!(table.canonical_type("$self"), None);
        assert_eq!(table.records("$self").len(), 2);
    }

    #[test]
    fn test_statements_after_a_regex_with_quotes_are_kept() {
        let text = "sub tidy {\n    my ($msg) = @_;\n    $msg =~ s/'//g; my $clean = $msg;\n}\n";
        let table = parse(text, ParseMode::SelfNavigation);
        assert_eq!(only(&table, "$clean").line(), 2);
    }

    #[test]
    fn test_around_and_autoload_accessor() {
        let text = "package Foo;\nuse Moose;\naround save => sub {\n    my ($orig, $self) = @_;\n};\nsub total { my $self = shift; $self->{_total} ||= 0; }\n";
        let table = parse(text, ParseMode::SelfNavigation);
        assert_eq!(only(&table, "save").kind, SymbolKind::LocalMethod);
        assert!(table.autoloads.contains_key("total"));
        assert_eq!(table.records("total").len(), 1);
    }

    #[test]
    fn test_web_routes_need_framework_import() {
        let plain = parse("get '/home' => sub {\n};\n", ParseMode::SelfNavigation);
        assert!(plain.is_empty());

        let text = "use Dancer2;\nget '/home' => sub {\n    return 1;\n};\nany ['get', 'post'] => '/form' => sub {\n};\nhook before => sub {\n};\n";
        let table = parse(text, ParseMode::Outline);
        let home = only(&table, "get /home");
        assert_eq!(home.kind, SymbolKind::HttpRoute);
        assert_eq!(home.location.end_line, 3);
        assert_eq!(only(&table, "any /form").line(), 4);
        assert_eq!(only(&table, "before").line(), 6);
    }

    #[test]
    fn test_outline_extents_and_outline_only_subs() {
        let text = "package Foo;\nsub one {\n    my $s = \"}\";\n    return 1;\n}\nmy $cb = sub {\n};\n*alias = sub {\n};\npackage Bar;\nsub two { }\n";
        let table = parse(text, ParseMode::Outline);
        let foo = only(&table, "Foo");
        assert_eq!((foo.location.start_line, foo.location.end_line), (0, 8));
        let one = only(&table, "one");
        assert_eq!((one.location.start_line, one.location.end_line), (1, 4));
        assert_eq!(only(&table, "$cb").kind, SymbolKind::OutlineOnlySub);
        assert_eq!(only(&table, "alias").location.end_line, 8);
        assert_eq!(only(&table, "Bar").location.end_line, 10);
        // no locals in outlines
        assert!(table.records("$s").is_empty());
    }

    #[test]
    fn test_unterminated_package_block_ends_at_last_line() {
        let table = parse("package Foo {\nsub f {\n}\n", ParseMode::Outline);
        assert_eq!(only(&table, "Foo").location.end_line, 2);
    }

    #[test]
    fn test_other_modes_use_declaration_line_for_both_ends() {
        let table = parse("package Foo;\nsub f {\n    1;\n}\n", ParseMode::SelfNavigation);
        let f = only(&table, "f");
        assert_eq!(f.location.start_line, f.location.end_line);
    }

    #[test]
    fn test_refinement_mode_only_sees_packages_and_subs() {
        let text = "package Foo;\nuse Moose;\nmy $x = 1;\nsub bar ($y) {\n}\n";
        let table = parse(text, ParseMode::Refinement);
        assert_eq!(
            kinds(&table),
            vec![
                ("Foo".to_string(), SymbolKind::Package, 0),
                ("bar".to_string(), SymbolKind::LocalSub, 3),
            ]
        );
        assert!(table.imported.is_empty());
    }

    #[test]
    fn test_reparse_is_identical() {
        let text = "package Foo;\nuse Moose;\nhas size => (is => 'ro');\nsub grow { my ($self, $by) = @_; }\n";
        assert_eq!(
            parse(text, ParseMode::SelfNavigation),
            parse(text, ParseMode::SelfNavigation)
        );
    }
}
