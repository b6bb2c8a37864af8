use crate::model::Theme;

/// Colours for one theme. `levels[0]` is the empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub text: &'static str,
    pub levels: [&'static str; 5],
}

const LIGHT: Palette = Palette {
    background: "#ffffff",
    text: "#57606a",
    levels: ["#ebedf0", "#9be9a8", "#40c463", "#30a14e", "#216e39"],
};

const DARK: Palette = Palette {
    background: "#0d1117",
    text: "#8b949e",
    levels: ["#161b22", "#0e4429", "#006d32", "#26a641", "#39d353"],
};

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => LIGHT,
            Theme::Dark => DARK,
        }
    }

    pub fn fill(&self, level: usize) -> &'static str {
        self.levels[level.min(self.levels.len() - 1)]
    }
}
