use crate::models::ResultPage;
use tera::{Context, Tera};

const INDEX: &str = "index.html";
const DISPLAY: &str = "display.html";
const ABOUT: &str = "about.html";

/// Page templates, compiled into the binary.
pub struct Pages {
    tera: Tera,
}

impl Pages {
    pub fn new() -> tera::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (INDEX, include_str!("../templates/index.html")),
            (DISPLAY, include_str!("../templates/display.html")),
            (ABOUT, include_str!("../templates/about.html")),
        ])?;
        Ok(Self { tera })
    }

    pub fn home(&self) -> tera::Result<String> {
        self.tera.render(INDEX, &Context::new())
    }

    pub fn result(&self, page: &ResultPage) -> tera::Result<String> {
        self.tera.render(DISPLAY, &Context::from_serialize(page)?)
    }

    pub fn about(&self) -> tera::Result<String> {
        self.tera.render(ABOUT, &Context::new())
    }
}
