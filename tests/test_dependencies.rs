use depfix::{Config, RelativePathContext, depfile::Dependencies};
use tests::mock_io::*;

fn depfile() -> String {
    format!(
        "obj/main.o: {} {} \\\n  /usr/include/stdio.h ../shared/util.h\n{}:\n",
        proj_path("src/main.c"),
        proj_path("include/a\\ b.h"),
        proj_path("include/a\\ b.h"),
    )
}

#[test]
fn relative_within_base_dir() {
    _ = tracing_subscriber::fmt::try_init();

    let ctx = RelativePathContext::new(TEST_BASE_DIR, test_cwd());
    let deps = Dependencies::from_depfile(&ctx, &depfile());
    assert_eq!(
        deps.paths,
        [
            "../src/main.c",
            "../include/a b.h",
            "/usr/include/stdio.h",
            "../shared/util.h",
        ]
    );
    assert!(deps.has_absolute_paths);
}

#[test]
fn base_dir_disabled() {
    let config = Config::default();
    let ctx = config.relative_path_context(test_cwd());
    let deps = Dependencies::from_depfile(&ctx, &depfile());
    assert_eq!(
        deps.paths,
        [
            proj_path("src/main.c"),
            proj_path("include/a b.h"),
            String::from("/usr/include/stdio.h"),
            String::from("../shared/util.h"),
        ]
    );
    assert!(deps.has_absolute_paths);
}

#[test]
fn only_relative_paths() {
    let ctx = RelativePathContext::new(TEST_BASE_DIR, test_cwd());
    let deps = Dependencies::from_depfile(&ctx, "main.o: main.c main.h\nmain.h:\n");
    assert_eq!(deps.paths, ["main.c", "main.h"]);
    assert!(!deps.has_absolute_paths);

    let deps = Dependencies::from_depfile(&ctx, "");
    assert!(deps.paths.is_empty());
}
