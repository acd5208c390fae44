//
// parse/parser_pool.rs
//
// Thread-local parser pool for efficient parser reuse
//

use std::cell::RefCell;
use tree_sitter::Parser;

thread_local! {
    static PARSER: RefCell<Parser> = RefCell::new({
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_r::LANGUAGE.into())
            .expect("Failed to set R language");
        parser
    });
}

/// Execute a function with a thread-local parser instance.
/// The parser is reused across calls on the same thread.
pub fn with_parser<F, R>(f: F) -> R
where
    F: FnOnce(&mut Parser) -> R,
{
    PARSER.with(|parser| f(&mut parser.borrow_mut()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_initialized_with_r_language() {
        let result = with_parser(|parser| parser.parse("x <- 1", None).is_some());
        assert!(result, "Parser should successfully parse R code");
    }

    #[test]
    fn test_parser_reuse_on_same_thread() {
        let result1 = with_parser(|parser| parser.parse("a <- 1", None).is_some());
        let result2 = with_parser(|parser| parser.parse("b <- function() {}", None).is_some());
        assert!(result1 && result2, "All parses should succeed");
    }
}
