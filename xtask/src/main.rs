/// Bundles the plugin through nih_plug_xtask:
///
///   cargo xtask bundle tempo-delay --release
///
/// The result lands in `target/bundled/` as `Tempo Delay.vst3` and
/// `Tempo Delay.clap`.
fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}
