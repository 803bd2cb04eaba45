fn main() -> anyhow::Result<()> {
    folio_ngin::flow::run()
}
