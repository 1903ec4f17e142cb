use exodep_lib::bootstrap::collect_recipe_names;
use exodep_lib::consts::{DEFAULT_HOSTING, HOST_TEMPLATES, http_timeout_secs, imports_dir};
use exodep_lib::platform::{Os, host_triple};

use crate::output::{print_info, print_stat};

pub fn cmd_info() {
  println!("System:");
  print_stat("Platform", &host_triple());
  match Os::current() {
    Some(os) => print_stat("Recipe OS modifier", os.keyword()),
    None => print_info("No recipe OS modifier matches this platform."),
  }

  println!();
  println!("Configuration:");
  let imports = imports_dir();
  print_stat("Imports directory", &imports);
  print_stat("HTTP timeout", &format!("{}s", http_timeout_secs()));

  println!();
  println!("Hosting providers:");
  for (name, template) in HOST_TEMPLATES {
    let marker = if *name == DEFAULT_HOSTING { " (default)" } else { "" };
    print_stat(&format!("{}{}", name, marker), template);
  }

  let recipes = collect_recipe_names(std::path::Path::new(&imports));
  if !recipes.is_empty() {
    println!();
    println!("Discovered recipes:");
    for name in recipes {
      print_info(&name);
    }
  }
}
