use iced::widget::{column, container, progress_bar, row, scrollable, text};
use iced::{Color, Element, Length};
use iced_widget::container::bordered_box;

use crate::models::SpeciesCount;
use crate::status::StatusLevel;

pub fn status_color(level: StatusLevel) -> Color {
    match level {
        StatusLevel::Info => Color::from_rgb8(0x4a, 0x9e, 0xff),
        StatusLevel::Warning => Color::from_rgb8(0xff, 0xc1, 0x07),
        StatusLevel::Error => Color::from_rgb8(0xff, 0x4b, 0x4b),
        StatusLevel::Success => Color::from_rgb8(0x21, 0xc3, 0x54),
    }
}

/// Sidebar on the left, main content taking the rest.
pub fn layout<'a, Message>(
    sidebar: impl Into<Element<'a, Message>>,
    main_content: impl Into<Element<'a, Message>>,
) -> Element<'a, Message>
where
    Message: 'a,
{
    row![
        container(scrollable(sidebar.into()))
            .style(bordered_box)
            .padding(10)
            .width(Length::FillPortion(1))
            .height(Length::Fill),
        container(scrollable(main_content.into()))
            .padding(10)
            .width(Length::FillPortion(3))
            .height(Length::Fill),
    ]
    .into()
}

/// Cumulative counts table: Species / Total Count.
pub fn species_table<'a, Message: 'a>(rows: &[SpeciesCount]) -> Element<'a, Message> {
    let mut table = column![row![
        text("Species").width(Length::FillPortion(2)),
        text("Total Count").width(Length::FillPortion(1)),
    ]]
    .spacing(4);

    for entry in rows {
        table = table.push(row![
            text(entry.species.clone()).width(Length::FillPortion(2)),
            text(entry.count.to_string()).width(Length::FillPortion(1)),
        ]);
    }

    container(table).style(bordered_box).padding(10).into()
}

/// Horizontal bar chart, one bar per (label, value).
pub fn bar_chart<'a, Message: 'a>(title: &str, bars: &[(String, u64)]) -> Element<'a, Message> {
    let max = bars.iter().map(|(_, value)| *value).max().unwrap_or(0).max(1) as f32;

    let mut chart = column![text(title.to_string()).size(16)].spacing(6);
    for (label, value) in bars {
        chart = chart.push(
            row![
                text(label.clone()).width(Length::FillPortion(1)),
                container(progress_bar(0.0..=max, *value as f32)).width(Length::FillPortion(3)),
                text(value.to_string()).width(Length::Shrink),
            ]
            .spacing(8),
        );
    }

    container(chart).padding(10).into()
}
