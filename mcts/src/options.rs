#[derive(Clone, Debug, PartialEq)]
pub struct DirichletOptions {
    pub alpha: f32,
    pub epsilon: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MCTSOptions {
    pub(crate) cpuct: f32,
    pub(crate) dirichlet: Option<DirichletOptions>,
}

impl MCTSOptions {
    pub fn new(cpuct: f32, dirichlet: Option<DirichletOptions>) -> Self {
        MCTSOptions { cpuct, dirichlet }
    }

    pub fn cpuct(&self) -> f32 {
        self.cpuct
    }

    /// Root noise is only mixed in when it has a positive weight.
    pub fn dirichlet(&self) -> Option<&DirichletOptions> {
        self.dirichlet.as_ref().filter(|d| d.epsilon > 0.0)
    }
}

impl Default for MCTSOptions {
    fn default() -> Self {
        MCTSOptions::new(1.4, None)
    }
}
