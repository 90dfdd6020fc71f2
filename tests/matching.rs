//! End-to-end matching behavior of frozen command trees

use command_tree::commands::config::{CommandsConfig, DuplicatePolicy};
use command_tree::{
    ArgumentParser, Arguments, CommandNode, CommandTree, Commands, Cursor, Executable, NodeKind, NumberParser,
    Outcome, ParseError, SetupError, Suggestion, Value, ValueParser,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

fn labelled<C: 'static>(label: &str) -> Executable<C, String> {
    let text = label.to_string();
    Executable::new(move |_: &C, _: &Arguments| text.clone()).with_label(label)
}

fn commands(usages: &[&str]) -> Commands<(), String> {
    let mut tree = CommandTree::new();
    for usage in usages {
        tree.register(usage, labelled(usage)).unwrap();
    }
    tree.freeze()
}

fn labels<C>(result: &command_tree::ParseResult<C, String>) -> Vec<String> {
    result.matches().iter().map(|found| found.execute()).collect()
}

fn texts(suggestions: &[Suggestion]) -> Vec<&str> {
    suggestions.iter().map(Suggestion::text).collect()
}

/// Online players, the context handed to every parse
type Online = Vec<String>;

struct Players;

impl ArgumentParser<Online> for Players {
    fn parse(&self, online: &Online, cursor: &mut Cursor<'_>) -> Result<Value, ParseError> {
        let start = cursor.position();
        let name = cursor.peek_remaining().split(' ').next().unwrap_or_default();
        cursor.set_position(start + name.len());
        if online.iter().any(|player| player == name) {
            Ok(Value::String(name.to_string()))
        } else {
            Err(ParseError::new(format!("Unknown player '{}'", name)))
        }
    }

    fn suggest(&self, online: &Online, _arguments: &Arguments, cursor: &Cursor<'_>) -> Vec<Suggestion> {
        let typed = cursor.peek_remaining().split(' ').next().unwrap_or_default();
        online
            .iter()
            .filter(|player| player.starts_with(typed))
            .map(|player| Suggestion::tooltip(player.as_str(), "online"))
            .collect()
    }

    fn describe(&self) -> String {
        "player".to_string()
    }
}

fn online() -> Online {
    vec!["alice".to_string(), "bob".to_string()]
}

fn messaging() -> Commands<Online, String> {
    let mut tree = CommandTree::new();
    tree.parsers_mut().register("player", ValueParser::custom(Players));
    tree.register("msg <to:player> <text:greedy>", labelled("msg"))
        .unwrap()
        .register("msg all <text:greedy>", labelled("broadcast"))
        .unwrap();
    tree.freeze()
}

#[test]
fn test_single_match_binds_every_argument() {
    let result = commands(&["greet <name:word> <times:int>"]).parse((), "greet bob 3").unwrap();

    assert_eq!(result.matches().len(), 1);
    let found = &result.matches()[0];
    assert_eq!(found.arguments().len(), 2);
    assert_eq!(found.arguments().get_as::<String>("name"), Some("bob".to_string()));
    assert_eq!(found.arguments().get("times"), Some(&Value::I32(3)));
    assert_eq!(found.execute(), "greet <name:word> <times:int>");
}

#[test]
fn test_empty_input_never_matches() {
    let result = commands(&["greet <name:word>", "stop"]).parse((), "").unwrap();

    assert!(result.matches().is_empty());
    assert_eq!(result.failures().len(), 2);
    assert_eq!(result.failures()[0].reason(), "Expected 'greet', but got nothing.");
    let completion = result.completion().unwrap();
    assert_eq!(completion.position, 0);
    assert_eq!(texts(&completion.suggestions), vec!["greet", "stop"]);
}

#[test]
fn test_leading_optional_can_be_skipped() {
    let commands = commands(&["[n:int] y"]);

    let result = commands.parse((), "y").unwrap();
    assert_eq!(result.matches().len(), 1);
    assert!(result.matches()[0].arguments().is_absent("n"));

    let result = commands.parse((), "4 y").unwrap();
    assert_eq!(result.matches().len(), 1);
    assert_eq!(result.matches()[0].arguments().get_as::<i32>("n"), Some(4));
}

#[test]
fn test_optional_is_skipped_even_when_its_parser_accepts() {
    // "y" is a fine word, but only the path without it reaches the end
    let result = commands(&["[name:word] y"]).parse((), "y").unwrap();

    assert_eq!(result.matches().len(), 1);
    assert!(result.matches()[0].arguments().is_absent("name"));
    assert!(result
        .failures()
        .iter()
        .any(|failure| failure.reason() == "Not enough arguments." && failure.position() == 1));
}

#[test]
fn test_optional_in_the_middle() {
    let commands = commands(&["give [count:int] <item:word>"]);

    let result = commands.parse((), "give apple").unwrap();
    assert_eq!(result.matches().len(), 1);
    let arguments = result.matches()[0].arguments();
    assert!(arguments.is_absent("count"));
    assert_eq!(arguments.get_as::<String>("item"), Some("apple".to_string()));

    let result = commands.parse((), "give 3 apple").unwrap();
    assert_eq!(result.matches().len(), 1);
    assert_eq!(result.matches()[0].arguments().get_as::<i64>("count"), Some(3));
}

#[test]
fn test_failed_optional_path_keeps_deepest_failure() {
    let result = commands(&["[n:int] y"]).parse((), "5 z").unwrap();

    assert!(result.matches().is_empty());
    let deepest = result.deepest_failure().unwrap();
    assert_eq!(deepest.position(), 2);
    assert_eq!(deepest.reason(), "Expected 'y', but got 'z'.");
}

#[test]
fn test_trailing_optionals_are_gathered() {
    let commands = commands(&["list [page:int] [size:int]"]);

    let result = commands.parse((), "list").unwrap();
    assert_eq!(result.matches().len(), 1);
    let arguments = result.matches()[0].arguments();
    assert!(arguments.is_absent("page"));
    assert!(arguments.is_absent("size"));

    let result = commands.parse((), "list 2").unwrap();
    assert_eq!(result.matches().len(), 1);
    let arguments = result.matches()[0].arguments();
    assert_eq!(arguments.get_as::<i32>("page"), Some(2));
    assert!(arguments.is_absent("size"));

    let result = commands.parse((), "list 2 30").unwrap();
    assert_eq!(result.matches().len(), 1);
    assert_eq!(result.matches()[0].arguments().get_as::<i32>("size"), Some(30));
}

#[test]
fn test_merged_paths_match_separately() {
    let commands = commands(&["greet <name:word>", "greet <name:word> loudly"]);

    let greet = &commands.root().children()[0];
    assert_eq!(commands.root().children().len(), 1);
    assert_eq!(greet.children().len(), 1);
    assert_eq!(greet.children()[0].children().len(), 2);

    let result = commands.parse((), "greet bob").unwrap();
    assert_eq!(labels(&result), vec!["greet <name:word>"]);
    let result = commands.parse((), "greet bob loudly").unwrap();
    assert_eq!(labels(&result), vec!["greet <name:word> loudly"]);
}

#[test]
fn test_sibling_literals_share_their_parent() {
    let commands = commands(&["a b", "a c"]);
    let root = commands.root();
    assert_eq!(root.children().len(), 1);
    let a = &root.children()[0];
    assert!(matches!(a.kind(), NodeKind::Literal(token) if token == "a"));
    assert_eq!(a.children().len(), 2);
}

#[test]
fn test_number_bounds() {
    let mut tree = CommandTree::new();
    tree.parsers_mut()
        .register("volume", NumberParser::i32().with_bounds(0.0, 10.0));
    tree.register("set <level:volume>", labelled("set")).unwrap();
    let commands = tree.freeze();

    assert_eq!(commands.parse((), "set 10").unwrap().matches().len(), 1);
    assert_eq!(commands.parse((), "set 0").unwrap().matches().len(), 1);

    let result = commands.parse((), "set 11").unwrap();
    assert!(result.matches().is_empty());
    let failure = result.deepest_failure().unwrap();
    assert_eq!(failure.position(), 4);
    assert_eq!(failure.reason(), "11 is too big. It has to be smaller or equal to 10");

    let result = commands.parse((), "set -1").unwrap();
    assert_eq!(
        result.deepest_failure().unwrap().reason(),
        "-1 is too small. It has to be greater or equal to 0"
    );
}

#[test]
fn test_partial_literal_suggests_the_literal() {
    let result = commands(&["test"]).parse((), "tes").unwrap();

    assert!(result.matches().is_empty());
    assert_eq!(result.failures().len(), 1);
    let failure = &result.failures()[0];
    assert_eq!(failure.position(), 0);
    assert_eq!(failure.reason(), "Expected 'test', but got 'tes'.");
    assert_eq!(texts(failure.suggestions()), vec!["test"]);
}

#[test]
fn test_best_match_is_highest_priority() {
    let mut tree = CommandTree::new();
    tree.register("a", labelled("literal").with_priority(5))
        .unwrap()
        .register("<x:word>", labelled("argument").with_priority(10))
        .unwrap();
    let result = tree.freeze().parse((), "a").unwrap();

    assert_eq!(result.matches().len(), 2);
    let best = result.best_match().unwrap();
    assert_eq!(best.priority(), 10);
    assert_eq!(best.execute(), "argument");
    assert!(matches!(result.outcome(), Outcome::Matched(found) if found.label() == Some("argument")));
}

#[test]
fn test_execute_invokes_every_time() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut tree = CommandTree::new();
    tree.register(
        "ping",
        Executable::new(move |_: &(), _: &Arguments| counter.fetch_add(1, Ordering::SeqCst)),
    )
    .unwrap();
    let result = tree.freeze().parse((), "ping").unwrap();
    let found = result.best_match().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    found.execute();
    found.execute();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_executable_errors_pass_through() {
    let mut tree: CommandTree<(), Result<i32, String>> = CommandTree::new();
    tree.register(
        "div <a:int> <b:int>",
        Executable::new(|_: &(), arguments: &Arguments| {
            let a = arguments.get_as::<i32>("a").unwrap_or_default();
            match arguments.get_as::<i32>("b") {
                Some(0) | None => Err("division by zero".to_string()),
                Some(b) => Ok(a / b),
            }
        }),
    )
    .unwrap();
    let commands = tree.freeze();

    let result = commands.parse((), "div 9 3").unwrap();
    assert_eq!(result.best_match().unwrap().execute(), Ok(3));
    let result = commands.parse((), "div 9 0").unwrap();
    assert_eq!(result.best_match().unwrap().execute(), Err("division by zero".to_string()));
}

#[test]
fn test_too_many_arguments() {
    let result = commands(&["stop"]).parse((), "stop now").unwrap();

    assert!(result.matches().is_empty());
    assert_eq!(result.failures().len(), 1);
    assert_eq!(result.failures()[0].reason(), "Too many arguments.");
    assert_eq!(result.failures()[0].position(), 4);
}

#[test]
fn test_not_enough_arguments() {
    let result = commands(&["give <item:word>"]).parse((), "give").unwrap();

    assert!(result.matches().is_empty());
    let failure = result.deepest_failure().unwrap();
    assert_eq!(failure.reason(), "Not enough arguments.");
    assert_eq!(failure.position(), 4);
}

#[test]
fn test_failure_path_records_visited_segments() {
    let result = commands(&["give <item:word>"]).parse((), "give").unwrap();
    let path = result.deepest_failure().unwrap().path();

    assert_eq!(path.len(), 2);
    assert_eq!(path[0].position(), 0);
    assert_eq!(path[1].position(), 0);
    assert!(matches!(path[1].node(), command_tree::SegmentNode::Literal { token } if token == "give"));
}

#[test]
fn test_custom_parser_reads_the_context() {
    let commands = messaging();

    let result = commands.parse(online(), "msg bob hello there").unwrap();
    assert_eq!(labels(&result), vec!["msg"]);
    let arguments = result.matches()[0].arguments();
    assert_eq!(arguments.get_as::<String>("to"), Some("bob".to_string()));
    assert_eq!(arguments.get_as::<String>("text"), Some("hello there".to_string()));

    let result = commands.parse(vec!["carol".to_string()], "msg bob hello").unwrap();
    assert!(result.matches().is_empty());
    assert_eq!(result.deepest_failure().unwrap().reason(), "Unknown player 'bob'");
}

#[test]
fn test_suggestions_while_typing_an_argument() {
    let commands = messaging();

    let result = commands.parse(online(), "msg a").unwrap();
    let completion = result.completion().unwrap();
    assert_eq!(completion.position, 4);
    assert_eq!(texts(&completion.suggestions), vec!["alice", "all"]);
    assert_eq!(completion.suggestions[0].tooltip_text(), Some("online"));

    let result = commands.parse(online(), "msg ").unwrap();
    let completion = result.completion().unwrap();
    assert_eq!(completion.position, 4);
    assert_eq!(texts(&completion.suggestions), vec!["alice", "bob", "all"]);
}

#[test]
fn test_complete_argument_offers_alternatives() {
    let result = messaging().parse(online(), "msg alice").unwrap();

    assert!(result.matches().is_empty());
    assert!(result
        .failures()
        .iter()
        .any(|failure| failure.reason() == "Alternative Usages" && failure.position() == 4));
    let completion = result.completion().unwrap();
    assert_eq!(completion.position, 4);
    assert_eq!(texts(&completion.suggestions), vec!["alice", "all"]);
    assert_eq!(result.deepest_failure().unwrap().reason(), "Not enough arguments.");
}

#[test]
fn test_suggestion_limit_and_policy_from_config() {
    let mut config = CommandsConfig::default();
    config.suggestions.limit = 1;
    config.suggestions.duplicates = DuplicatePolicy::KeepLast;
    let mut tree = CommandTree::new().with_config(config);
    tree.register("stop", labelled("stop"))
        .unwrap()
        .register("start", labelled("start"))
        .unwrap();
    let result = tree.freeze().parse((), "st").unwrap();

    assert_eq!(texts(&result.completion().unwrap().suggestions), vec!["stop"]);
}

#[test]
fn test_validity_hides_whole_subtrees() {
    let mut tree: CommandTree<u32, String> = CommandTree::new();
    tree.register("admin kick <who:word>", labelled("kick").with_validity(|level: &u32| *level >= 2))
        .unwrap()
        .register("help", labelled("help"))
        .unwrap();
    let commands = tree.freeze();

    let result = commands.parse(0, "admin kick bob").unwrap();
    assert!(result.matches().is_empty());
    assert_eq!(result.failures().len(), 1);
    assert_eq!(texts(result.failures()[0].suggestions()), vec!["help"]);

    let result = commands.parse(3, "admin kick bob").unwrap();
    assert_eq!(labels(&result), vec!["kick"]);
}

#[test]
fn test_nothing_valid_is_unknown() {
    let mut tree: CommandTree<bool, String> = CommandTree::new();
    tree.register("secret", labelled("secret").with_validity(|allowed: &bool| *allowed))
        .unwrap();
    let result = tree.freeze().parse(false, "secret").unwrap();

    assert!(result.matches().is_empty());
    assert!(result.failures().is_empty());
    assert_eq!(result.outcome().to_string(), "Unknown or incomplete command.");
}

#[test]
fn test_cached_validity_follows_the_key() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut tree: CommandTree<u32, String> = CommandTree::new();
    tree.register(
        "op",
        labelled("op").with_validity(move |level: &u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            *level > 0
        }),
    )
    .unwrap();
    let commands = tree.freeze();
    let key = command_tree::CacheKey::new(1, 0);

    assert_eq!(commands.parse_cached(1, key, "op").unwrap().matches().len(), 1);
    let after_first = calls.load(Ordering::SeqCst);
    assert_eq!(commands.parse_cached(1, key, "op").unwrap().matches().len(), 1);
    // the executable itself is still asked once per candidate match
    assert_eq!(calls.load(Ordering::SeqCst), after_first + 1);
}

struct Backwards;

impl ArgumentParser<()> for Backwards {
    fn parse(&self, _context: &(), cursor: &mut Cursor<'_>) -> Result<Value, ParseError> {
        cursor.set_position(0);
        Ok(Value::Bool(true))
    }

    fn describe(&self) -> String {
        "backwards".to_string()
    }
}

struct OneChar;

impl ArgumentParser<()> for OneChar {
    fn parse(&self, _context: &(), cursor: &mut Cursor<'_>) -> Result<Value, ParseError> {
        cursor
            .read()
            .map(|c| Value::String(c.to_string()))
            .ok_or_else(|| ParseError::new("Expected a char, but got nothing."))
    }

    fn describe(&self) -> String {
        "char".to_string()
    }
}

fn misbehaving(parser: impl ArgumentParser<()> + 'static) -> Commands<(), String> {
    let mut tree = CommandTree::new();
    tree.add(CommandNode::path(
        [CommandNode::literal("x"), CommandNode::argument("v", ValueParser::custom(parser), false)],
        labelled("x"),
    ))
    .unwrap();
    tree.freeze()
}

#[test]
fn test_parser_moving_backwards_aborts() {
    let err = misbehaving(Backwards).parse((), "x abc").unwrap_err();
    assert!(matches!(err, SetupError::CursorMovedBackwards { ref argument, .. } if argument == "v"));
}

#[test]
fn test_parser_leaving_a_partial_token_aborts() {
    let err = misbehaving(OneChar).parse((), "x abc").unwrap_err();
    assert!(matches!(err, SetupError::PartialToken { ref parser, .. } if parser == "char"));
    assert!(misbehaving(OneChar).parse((), "x a").unwrap().best_match().is_some());
}

#[test]
fn test_registering_a_usage_twice_is_ambiguous() {
    let mut tree: CommandTree<(), String> = CommandTree::new();
    tree.register("reload", labelled("first")).unwrap();
    let err = tree.register("reload", labelled("second")).err().unwrap();

    match err {
        SetupError::InUsage { usage, source } => {
            assert_eq!(usage, "reload");
            assert!(matches!(*source, SetupError::AmbiguousExecutable { .. }));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_own_executable_and_leaf_on_one_path_are_ambiguous() {
    let mut tree: CommandTree<(), String> = CommandTree::new();
    tree.add(CommandNode::literal("a").with_executable(labelled("own")))
        .unwrap();
    let err = tree
        .add(CommandNode::path([CommandNode::literal("a")], labelled("leaf")))
        .err()
        .unwrap();
    assert!(matches!(err, SetupError::AmbiguousExecutable { ref node } if node == "literal 'a'"));

    let mut tree: CommandTree<(), String> = CommandTree::new();
    tree.add(CommandNode::path([CommandNode::literal("a")], labelled("leaf")))
        .unwrap();
    let err = tree
        .add(CommandNode::literal("a").with_executable(labelled("own")))
        .err()
        .unwrap();
    assert!(matches!(err, SetupError::AmbiguousExecutable { .. }));
}

#[test]
fn test_tabs_belong_to_the_word() {
    let result = commands(&["give <item:word>"]).parse((), "give a\tb").unwrap();

    assert_eq!(result.matches().len(), 1);
    assert_eq!(result.matches()[0].arguments().get_as::<String>("item"), Some("a\tb".to_string()));
}

#[test]
fn test_text_after_a_closing_quote_is_a_failure() {
    let result = commands(&["say <msg>"]).parse((), "say \"hi\"there").unwrap();

    assert!(result.matches().is_empty());
    let deepest = result.deepest_failure().unwrap();
    assert_eq!(deepest.position(), 4);
    assert_eq!(deepest.reason(), "Expected a space after the closing quote.");

    let result = commands(&["say <msg>"]).parse((), "say \"hi there\"").unwrap();
    assert_eq!(result.matches()[0].arguments().get_as::<String>("msg"), Some("hi there".to_string()));
}

#[test]
fn test_multibyte_word_after_a_skipped_optional() {
    let result = commands(&["give [count:int] <item:word>"]).parse((), "give é").unwrap();

    assert_eq!(result.matches().len(), 1);
    let arguments = result.matches()[0].arguments();
    assert!(arguments.is_absent("count"));
    assert_eq!(arguments.get_as::<String>("item"), Some("é".to_string()));
}

#[test]
fn test_validity_is_asked_once_per_node() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut tree: CommandTree<(), String> = CommandTree::new();
    tree.register(
        "a b c",
        labelled("abc").with_validity(move |_: &()| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        }),
    )
    .unwrap();

    let result = tree.freeze().parse((), "a b c").unwrap();
    assert_eq!(labels(&result), vec!["abc"]);
    // once while checking the subtrees, once more when the match is recorded
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_parses_concurrently() {
    let commands = commands(&["greet <name:word>", "greet <name:word> loudly", "stop"]);
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let commands = commands.clone();
            thread::spawn(move || {
                let input = if i % 2 == 0 { "greet bob loudly" } else { "stop" };
                let result = commands.parse((), input).unwrap();
                result.best_match().map(|found| found.execute())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();
    assert_eq!(
        results,
        vec![
            Some("greet <name:word> loudly".to_string()),
            Some("stop".to_string()),
            Some("greet <name:word> loudly".to_string()),
            Some("stop".to_string()),
        ]
    );
}
