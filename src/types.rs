use impl_helper::ImplHelper;
use ratatui::Frame;

pub trait Render {
    fn render(&mut self, frame: &mut Frame);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDirection {
    Next,
    Prev,
}

/// Keeps a view in sync with its model: every mutation goes through the model
/// and the view is rebuilt from it, so the view never holds state of its own
#[derive(Debug, Default, ImplHelper)]
pub struct ViewModel<V, M> {
    view: V,

    #[helper(get)]
    model: M,
}

impl<V, M> ViewModel<V, M>
where
    M: std::fmt::Debug,
    V: for<'a> From<&'a M>,
{
    pub fn with_model_mut<F, T>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut M) -> T,
    {
        let result = f(&mut self.model);
        self.view = V::from(&self.model);
        result
    }

    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn model_set(mut self, model: M) -> Self {
        self.model = model;
        self.view = V::from(&self.model);
        self
    }
}

impl<V, M> Render for ViewModel<V, M>
where
    V: Render,
{
    fn render(&mut self, frame: &mut Frame) {
        self.view.render(frame);
    }
}
