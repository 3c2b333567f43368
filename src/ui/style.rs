//! Minimal color/style types, converted into ratatui's at render time.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const WHITE: Color = Color::new(230, 230, 230);
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const GRAY: Color = Color::new(150, 150, 150);
    pub const DARK_GRAY: Color = Color::new(90, 90, 90);
    pub const SELECTION_BG: Color = Color::new(45, 60, 90);
    pub const CYAN: Color = Color::new(80, 200, 220);
    pub const YELLOW: Color = Color::new(240, 200, 60);
    pub const ORANGE: Color = Color::new(240, 140, 40);
    pub const LIME: Color = Color::new(140, 220, 60);
    pub const RED: Color = Color::new(220, 40, 40);
    pub const MAGENTA: Color = Color::new(200, 100, 220);
    pub const AMBER: Color = Color::new(255, 176, 0);
}

impl From<Color> for ratatui::style::Color {
    fn from(c: Color) -> Self {
        ratatui::style::Color::Rgb(c.r, c.g, c.b)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    underline: bool,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    pub fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }
}

impl From<Style> for ratatui::style::Style {
    fn from(s: Style) -> Self {
        use ratatui::style::Modifier;
        let mut out = ratatui::style::Style::default();
        if let Some(fg) = s.fg {
            out = out.fg(fg.into());
        }
        if let Some(bg) = s.bg {
            out = out.bg(bg.into());
        }
        if s.bold {
            out = out.add_modifier(Modifier::BOLD);
        }
        if s.underline {
            out = out.add_modifier(Modifier::UNDERLINED);
        }
        out
    }
}
