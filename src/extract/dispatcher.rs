//! Strategy routing
//!
//! Each vendor declares an ordered table of strategies. Exclusive strategies
//! are tried in order until one handles the page; additive strategies run on
//! every page and may still mark it handled.

use super::Page;
use crate::crawler::Context;

/// How a strategy takes part in routing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Runs only while no earlier strategy has handled the page
    Exclusive,
    /// Runs on every page regardless of earlier results
    Additive,
}

/// A named page recognizer
///
/// `run` returns `true` when it recognized the page.
#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub mode: Mode,
    pub run: fn(&mut Context, &Page<'_>) -> bool,
}

impl Strategy {
    pub const fn exclusive(name: &'static str, run: fn(&mut Context, &Page<'_>) -> bool) -> Self {
        Self {
            name,
            mode: Mode::Exclusive,
            run,
        }
    }

    pub const fn additive(name: &'static str, run: fn(&mut Context, &Page<'_>) -> bool) -> Self {
        Self {
            name,
            mode: Mode::Additive,
            run,
        }
    }
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .finish()
    }
}

/// Runs a page through `strategies`
///
/// A page that no strategy handled gets an `Unable to process` error line,
/// unless it was reached by redirect or is the site root.
///
/// # Returns
///
/// `true` if some strategy handled the page
pub fn dispatch(ctx: &mut Context, page: &Page<'_>, strategies: &[Strategy]) -> bool {
    let mut handled = false;

    for strategy in strategies {
        if handled && strategy.mode == Mode::Exclusive {
            continue;
        }
        if (strategy.run)(ctx, page) {
            tracing::trace!(strategy = strategy.name, url = %page.url, "Strategy matched");
            handled = true;
        }
    }

    if !handled && !page.redirected && !is_site_root(page) {
        ctx.error(format!("Unable to process: {}", page.url));
    }
    handled
}

fn is_site_root(page: &Page<'_>) -> bool {
    matches!(page.url.path(), "" | "/")
}
