use buildgraph_lib::matrix::TargetSpec;
use buildgraph_lib::platform::{Optimization, Platform, Toolchain};

fn join<T: ToString>(values: impl IntoIterator<Item = T>) -> String {
  values.into_iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

fn print_matrix(name: &str, spec: &TargetSpec) {
  println!("  {}: {} configurations", name, spec.len());
  println!("    platforms:     {}", join(&spec.platforms));
  println!("    toolchains:    {}", join(&spec.toolchains));
  println!("    optimizations: {}", join(&spec.optimizations));
}

pub fn cmd_info() {
  println!("bgraph v{}", env!("CARGO_PKG_VERSION"));
  println!();
  println!("Platforms:     {}", join(Platform::ALL));
  println!("Toolchains:    {}", join(Toolchain::ALL));
  println!("Optimizations: {}", join(Optimization::ALL));
  println!();
  println!("Target matrices:");
  print_matrix("default", &TargetSpec::engine_default());
  print_matrix("tools", &TargetSpec::tools());
}
