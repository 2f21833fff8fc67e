use crate::cmd::{connect_driver, ConnectionArgs, ReadArgs};
use crate::exit::{driver_error, CliResult, SUCCESS};
use crate::output::{print_reading, OutputFormat};

/// An unknown channel or unreadable value prints NaN and still succeeds;
/// the reason goes to the event log.
pub fn run(args: ReadArgs, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut driver = connect_driver(conn)?;
    let value = driver
        .get_channel_value(&args.channel)
        .map_err(|err| driver_error("read failed", err))?;
    driver.disconnect();

    print_reading(&args.channel, value, format);
    Ok(SUCCESS)
}
